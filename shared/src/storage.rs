//! Ports to the external services the handlers depend on.
//!
//! Each Lambda talks to exactly one table, so the DynamoDB adapter implements
//! every store trait over a single configured table name. The in-memory
//! adapters implement the same traits for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{AppResult, GuestbookEntry, LockRecord, Note, NoteUpdate};

#[async_trait]
pub trait GuestbookStore: Send + Sync {
    async fn put_entry(&self, entry: &GuestbookEntry) -> AppResult<()>;

    /// Every stored entry, in no particular order
    async fn scan_entries(&self) -> AppResult<Vec<GuestbookEntry>>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn put_note(&self, note: &Note) -> AppResult<()>;

    async fn query_notes(&self, user_id: &str) -> AppResult<Vec<Note>>;

    /// Write the present fields of `update` plus `updated_at`.
    ///
    /// Fails with [`AppError::NoteNotFound`](crate::AppError::NoteNotFound) when
    /// `(user_id, note_id)` does not exist.
    async fn update_note(
        &self,
        user_id: &str,
        note_id: &str,
        update: &NoteUpdate,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Succeeds whether or not the note existed
    async fn delete_note(&self, user_id: &str, note_id: &str) -> AppResult<()>;
}

#[async_trait]
pub trait LockStore: Send + Sync {
    async fn get_lock(&self, user_id: &str) -> AppResult<Option<LockRecord>>;

    /// Set `verified` and `verified_until`, creating the record if needed
    async fn open_verification_window(&self, user_id: &str, until: DateTime<Utc>) -> AppResult<()>;

    /// Store a new password hash and stamp `updated_at`.
    ///
    /// With `consume_window` the verification attributes are removed in the
    /// same write.
    async fn set_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
        updated_at: DateTime<Utc>,
        consume_window: bool,
    ) -> AppResult<()>;
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// `Ok(false)` when the identity provider rejects the credentials;
    /// `Err` only when it could not be asked.
    async fn verify_credentials(&self, username: &str, password: &str) -> AppResult<bool>;
}
