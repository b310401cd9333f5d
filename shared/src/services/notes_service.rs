use crate::{
    generate_id, AppError, AppResult, Clock, CreateNoteRequest, Note, NoteStore, UpdateNoteRequest,
};

/// Note CRUD scoped to the calling user.
///
/// Every operation takes the caller's id from the authorizer claims; a user id
/// in the request body is never consulted.
pub struct NotesService<S, C> {
    store: S,
    clock: C,
}

impl<S: NoteStore, C: Clock> NotesService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub async fn create_note(&self, user_id: &str, request: CreateNoteRequest) -> AppResult<Note> {
        let note = Note::new(user_id, generate_id(), request, self.clock.now());
        self.store.put_note(&note).await?;

        tracing::info!("Created note {} for user {}", note.note_id, user_id);
        Ok(note)
    }

    pub async fn list_notes(&self, user_id: &str) -> AppResult<Vec<Note>> {
        let notes = self.store.query_notes(user_id).await?;
        tracing::info!("Read {} notes for user {}", notes.len(), user_id);
        Ok(notes)
    }

    pub async fn update_note(&self, user_id: &str, request: UpdateNoteRequest) -> AppResult<()> {
        let note_id = require_note_id(request.note_id.as_deref())?;

        self.store
            .update_note(user_id, note_id, &request.update, self.clock.now())
            .await?;

        tracing::info!("Updated note {} for user {}", note_id, user_id);
        Ok(())
    }

    pub async fn delete_note(&self, user_id: &str, note_id: Option<&str>) -> AppResult<()> {
        let note_id = require_note_id(note_id)?;

        self.store.delete_note(user_id, note_id).await?;

        tracing::info!("Deleted note {} for user {}", note_id, user_id);
        Ok(())
    }
}

fn require_note_id(note_id: Option<&str>) -> AppResult<&str> {
    match note_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(AppError::ValidationError("noteId is required".to_string())),
    }
}
