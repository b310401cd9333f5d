use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    AppError, AppResult, CredentialVerifier, GuestbookEntry, GuestbookStore, LockRecord,
    LockStore, Note, NoteStore, NoteUpdate,
};

#[derive(Debug, Default)]
struct Tables {
    guestbook: HashMap<String, GuestbookEntry>,
    notes: HashMap<(String, String), Note>,
    locks: HashMap<String, LockRecord>,
}

/// In-process stand-in for the DynamoDB tables.
///
/// Clones share the same tables, so a test can keep a handle while a service
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Raw lock record, expired windows included
    pub fn lock_record(&self, user_id: &str) -> Option<LockRecord> {
        self.tables().locks.get(user_id).cloned()
    }

    pub fn note(&self, user_id: &str, note_id: &str) -> Option<Note> {
        self.tables()
            .notes
            .get(&(user_id.to_string(), note_id.to_string()))
            .cloned()
    }
}

#[async_trait]
impl GuestbookStore for InMemoryStore {
    async fn put_entry(&self, entry: &GuestbookEntry) -> AppResult<()> {
        self.tables()
            .guestbook
            .insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    async fn scan_entries(&self) -> AppResult<Vec<GuestbookEntry>> {
        Ok(self.tables().guestbook.values().cloned().collect())
    }
}

#[async_trait]
impl NoteStore for InMemoryStore {
    async fn put_note(&self, note: &Note) -> AppResult<()> {
        self.tables()
            .notes
            .insert((note.user_id.clone(), note.note_id.clone()), note.clone());
        Ok(())
    }

    async fn query_notes(&self, user_id: &str) -> AppResult<Vec<Note>> {
        Ok(self
            .tables()
            .notes
            .values()
            .filter(|note| note.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_note(
        &self,
        user_id: &str,
        note_id: &str,
        update: &NoteUpdate,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut tables = self.tables();
        let note = tables
            .notes
            .get_mut(&(user_id.to_string(), note_id.to_string()))
            .ok_or_else(|| AppError::NoteNotFound(note_id.to_string()))?;

        note.apply(update, updated_at);
        Ok(())
    }

    async fn delete_note(&self, user_id: &str, note_id: &str) -> AppResult<()> {
        self.tables()
            .notes
            .remove(&(user_id.to_string(), note_id.to_string()));
        Ok(())
    }
}

#[async_trait]
impl LockStore for InMemoryStore {
    async fn get_lock(&self, user_id: &str) -> AppResult<Option<LockRecord>> {
        Ok(self.lock_record(user_id))
    }

    async fn open_verification_window(&self, user_id: &str, until: DateTime<Utc>) -> AppResult<()> {
        let mut tables = self.tables();
        let record = tables
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| LockRecord::empty(user_id));

        record.verified = true;
        record.verified_until = Some(until);
        Ok(())
    }

    async fn set_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
        updated_at: DateTime<Utc>,
        consume_window: bool,
    ) -> AppResult<()> {
        let mut tables = self.tables();
        let record = tables
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| LockRecord::empty(user_id));

        record.locked_password_hash = Some(password_hash.to_string());
        record.updated_at = Some(updated_at);
        if consume_window {
            record.verified = false;
            record.verified_until = None;
        }
        Ok(())
    }
}

/// Fixed username/password pairs standing in for the user pool
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentials {
    accounts: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, username: &str, password: &str) -> Self {
        self.accounts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(username.to_string(), password.to_string());
        self
    }
}

#[async_trait]
impl CredentialVerifier for InMemoryCredentials {
    async fn verify_credentials(&self, username: &str, password: &str) -> AppResult<bool> {
        let accounts = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
        Ok(accounts.get(username).map_or(false, |stored| stored == password))
    }
}
