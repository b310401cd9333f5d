use crate::{
    generate_id, AddMessageRequest, AppError, AppResult, Clock, GuestbookEntry, GuestbookStore,
    ANONYMOUS,
};

pub struct GuestbookService<S, C> {
    store: S,
    clock: C,
}

impl<S: GuestbookStore, C: Clock> GuestbookService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Validate and store a new guestbook message
    pub async fn add_message(&self, request: AddMessageRequest) -> AppResult<GuestbookEntry> {
        let message = request.message.as_deref().map(str::trim).unwrap_or_default();
        if message.is_empty() {
            return Err(AppError::ValidationError("Message is required".to_string()));
        }

        let name = match request.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => ANONYMOUS.to_string(),
        };

        let entry = GuestbookEntry {
            id: generate_id(),
            name,
            message: message.to_string(),
            created_at: self.clock.now(),
        };

        self.store.put_entry(&entry).await?;

        tracing::info!("Stored guestbook message: {}", entry.id);
        Ok(entry)
    }

    pub async fn list_messages(&self) -> AppResult<Vec<GuestbookEntry>> {
        let entries = self.store.scan_entries().await?;
        tracing::info!("Read {} guestbook messages", entries.len());
        Ok(entries)
    }
}
