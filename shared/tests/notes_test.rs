// Notes CRUD against the in-memory store
// Run with: cargo test -p serverless-shared --test notes_test

use chrono::{Duration, TimeZone, Utc};
use serverless_shared::{
    AppError, CreateNoteRequest, InMemoryStore, ManualClock, NoteUpdate, NotesService,
    UpdateNoteRequest,
};
use std::sync::Arc;

const ALICE: &str = "sub-alice";
const BOB: &str = "sub-bob";

fn service() -> (InMemoryStore, Arc<ManualClock>, NotesService<InMemoryStore, Arc<ManualClock>>) {
    let store = InMemoryStore::new();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap(),
    ));
    let service = NotesService::new(store.clone(), clock.clone());
    (store, clock, service)
}

fn titled(title: &str) -> CreateNoteRequest {
    CreateNoteRequest {
        title: Some(title.to_string()),
        content: Some(format!("{} body", title)),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_stamps_equal_timestamps_and_defaults() {
    let (store, _, service) = service();

    let note = service.create_note(ALICE, titled("Groceries")).await.unwrap();

    assert_eq!(note.user_id, ALICE);
    assert_eq!(note.created_at, note.updated_at);
    assert!(!note.is_archived && !note.is_locked && !note.is_pinned && !note.is_deleted);
    assert_eq!(store.note(ALICE, &note.note_id), Some(note));
}

#[tokio::test]
async fn test_create_accepts_initial_flags() {
    let (_, _, service) = service();
    let request = CreateNoteRequest {
        is_pinned: Some(true),
        is_locked: Some(true),
        ..Default::default()
    };

    let note = service.create_note(ALICE, request).await.unwrap();

    assert!(note.is_pinned);
    assert!(note.is_locked);
    assert!(!note.is_archived);
    assert!(!note.is_deleted);
    assert_eq!(note.title, "");
}

#[tokio::test]
async fn test_list_is_scoped_to_caller() {
    let (_, _, service) = service();
    let alice_note = service.create_note(ALICE, titled("Alice")).await.unwrap();
    service.create_note(BOB, titled("Bob")).await.unwrap();
    service.create_note(BOB, titled("Bob 2")).await.unwrap();

    let alice_notes = service.list_notes(ALICE).await.unwrap();
    let bob_notes = service.list_notes(BOB).await.unwrap();

    assert_eq!(alice_notes, vec![alice_note.clone()]);
    assert_eq!(bob_notes.len(), 2);
    assert!(bob_notes.iter().all(|n| n.user_id == BOB));
    assert!(!bob_notes.iter().any(|n| n.note_id == alice_note.note_id));
}

#[tokio::test]
async fn test_update_changes_only_present_fields() {
    let (store, clock, service) = service();
    let note = service.create_note(ALICE, titled("Draft")).await.unwrap();
    clock.advance(Duration::seconds(30));

    service
        .update_note(
            ALICE,
            UpdateNoteRequest {
                note_id: Some(note.note_id.clone()),
                update: NoteUpdate {
                    is_archived: Some(true),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();

    let updated = store.note(ALICE, &note.note_id).unwrap();
    assert!(updated.is_archived);
    assert_eq!(updated.title, "Draft");
    assert_eq!(updated.content, "Draft body");
    assert_eq!(updated.created_at, note.created_at);
    assert!(updated.updated_at > note.updated_at);
}

#[tokio::test]
async fn test_update_with_no_fields_still_refreshes_updated_at() {
    let (store, clock, service) = service();
    let note = service.create_note(ALICE, titled("Draft")).await.unwrap();
    clock.advance(Duration::minutes(2));

    service
        .update_note(
            ALICE,
            UpdateNoteRequest {
                note_id: Some(note.note_id.clone()),
                update: NoteUpdate::default(),
            },
        )
        .await
        .unwrap();

    let updated = store.note(ALICE, &note.note_id).unwrap();
    assert_eq!(updated.updated_at, note.updated_at + Duration::minutes(2));
    assert_eq!(updated.created_at, note.created_at);
}

#[tokio::test]
async fn test_update_requires_note_id() {
    let (_, _, service) = service();

    for note_id in [None, Some(String::new()), Some("   ".to_string())] {
        let result = service
            .update_note(
                ALICE,
                UpdateNoteRequest {
                    note_id,
                    update: NoteUpdate::default(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}

#[tokio::test]
async fn test_update_of_another_users_note_is_not_found() {
    let (store, _, service) = service();
    let note = service.create_note(ALICE, titled("Private")).await.unwrap();

    let result = service
        .update_note(
            BOB,
            UpdateNoteRequest {
                note_id: Some(note.note_id.clone()),
                update: NoteUpdate {
                    title: Some("Hijacked".to_string()),
                    ..Default::default()
                },
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NoteNotFound(_))));
    assert_eq!(store.note(ALICE, &note.note_id).unwrap().title, "Private");
    assert_eq!(store.note(BOB, &note.note_id), None);
}

#[tokio::test]
async fn test_delete_is_scoped_and_idempotent() {
    let (store, _, service) = service();
    let note = service.create_note(ALICE, titled("Temp")).await.unwrap();

    service.delete_note(BOB, Some(&note.note_id)).await.unwrap();
    assert!(store.note(ALICE, &note.note_id).is_some());

    service.delete_note(ALICE, Some(&note.note_id)).await.unwrap();
    assert!(store.note(ALICE, &note.note_id).is_none());

    service.delete_note(ALICE, Some(&note.note_id)).await.unwrap();
}

#[tokio::test]
async fn test_delete_requires_note_id() {
    let (_, _, service) = service();

    let result = service.delete_note(ALICE, None).await;

    assert!(matches!(result, Err(AppError::ValidationError(msg)) if msg == "noteId is required"));
}

#[tokio::test]
async fn test_note_id_is_used_verbatim() {
    let (store, _, service) = service();
    let note = service.create_note(ALICE, titled("Exact")).await.unwrap();
    let padded = format!(" {}", note.note_id);

    let update = service
        .update_note(
            ALICE,
            UpdateNoteRequest {
                note_id: Some(padded.clone()),
                update: NoteUpdate {
                    title: Some("Changed".to_string()),
                    ..Default::default()
                },
            },
        )
        .await;
    assert!(matches!(update, Err(AppError::NoteNotFound(id)) if id == padded));

    service.delete_note(ALICE, Some(&padded)).await.unwrap();

    let stored = store.note(ALICE, &note.note_id).unwrap();
    assert_eq!(stored.title, "Exact");
}
