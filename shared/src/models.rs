use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name stored when a guestbook message is signed without one
pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestbookEntry {
    pub id: String,
    pub name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddMessageRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub user_id: String,
    pub note_id: String,
    pub title: String,
    pub content: String,
    pub is_archived: bool,
    pub is_locked: bool,
    pub is_pinned: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build a fresh note owned by `user_id`. Both timestamps are `now`.
    pub fn new(user_id: &str, note_id: String, request: CreateNoteRequest, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            note_id,
            title: request.title.unwrap_or_default(),
            content: request.content.unwrap_or_default(),
            is_archived: request.is_archived.unwrap_or(false),
            is_locked: request.is_locked.unwrap_or(false),
            is_pinned: request.is_pinned.unwrap_or(false),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the fields present in `update` and stamp `updated_at`
    pub fn apply(&mut self, update: &NoteUpdate, now: DateTime<Utc>) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(content) = &update.content {
            self.content = content.clone();
        }
        if let Some(is_archived) = update.is_archived {
            self.is_archived = is_archived;
        }
        if let Some(is_locked) = update.is_locked {
            self.is_locked = is_locked;
        }
        if let Some(is_pinned) = update.is_pinned {
            self.is_pinned = is_pinned;
        }
        if let Some(is_deleted) = update.is_deleted {
            self.is_deleted = is_deleted;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_archived: Option<bool>,
    #[serde(default)]
    pub is_locked: Option<bool>,
    #[serde(default)]
    pub is_pinned: Option<bool>,
}

/// Partial update of a note. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_archived: Option<bool>,
    #[serde(default)]
    pub is_locked: Option<bool>,
    #[serde(default)]
    pub is_pinned: Option<bool>,
    #[serde(default)]
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub note_id: Option<String>,
    #[serde(flatten)]
    pub update: NoteUpdate,
}

/// Per-user gate protecting the locked section of the notes app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRecord {
    pub user_id: String,
    pub locked_password_hash: Option<String>,
    /// Only meaningful while `verified_until` is in the future
    pub verified: bool,
    pub verified_until: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LockRecord {
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            locked_password_hash: None,
            verified: false,
            verified_until: None,
            updated_at: None,
        }
    }

    pub fn has_password(&self) -> bool {
        self.locked_password_hash.is_some()
    }

    /// True while an unexpired verification window is open at `now`
    pub fn is_verified_at(&self, now: DateTime<Utc>) -> bool {
        self.verified && self.verified_until.map_or(false, |until| now <= until)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedSectionRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub account_password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockStatus {
    pub has_password: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_note_serializes_camel_case() {
        let note = Note::new("user-1", "note-1".to_string(), CreateNoteRequest::default(), t0());
        let value = serde_json::to_value(&note).unwrap();

        assert_eq!(value["userId"], "user-1");
        assert_eq!(value["noteId"], "note-1");
        assert_eq!(value["isArchived"], false);
        assert_eq!(value["isDeleted"], false);
        assert_eq!(value["createdAt"], value["updatedAt"]);
    }

    #[test]
    fn test_update_request_only_sets_present_fields() {
        let request: UpdateNoteRequest =
            serde_json::from_str(r#"{"noteId":"n1","isPinned":true,"title":"New"}"#).unwrap();

        assert_eq!(request.note_id.as_deref(), Some("n1"));
        assert_eq!(request.update.title.as_deref(), Some("New"));
        assert_eq!(request.update.is_pinned, Some(true));
        assert_eq!(request.update.content, None);
        assert_eq!(request.update.is_deleted, None);
        assert_ne!(request.update, NoteUpdate::default());
    }

    #[test]
    fn test_apply_leaves_created_at_alone() {
        let mut note = Note::new("user-1", "note-1".to_string(), CreateNoteRequest::default(), t0());
        let update = NoteUpdate {
            content: Some("body".to_string()),
            ..Default::default()
        };

        note.apply(&update, t0() + Duration::minutes(1));

        assert_eq!(note.content, "body");
        assert_eq!(note.title, "");
        assert_eq!(note.created_at, t0());
        assert_eq!(note.updated_at, t0() + Duration::minutes(1));
    }

    #[test]
    fn test_verification_window_is_inclusive_and_lazy() {
        let mut record = LockRecord::empty("user-1");
        assert!(!record.is_verified_at(t0()));

        record.verified = true;
        record.verified_until = Some(t0() + Duration::minutes(5));

        assert!(record.is_verified_at(t0()));
        assert!(record.is_verified_at(t0() + Duration::minutes(5)));
        assert!(!record.is_verified_at(t0() + Duration::minutes(5) + Duration::seconds(1)));
    }

    #[test]
    fn test_verified_flag_without_expiry_is_not_verified() {
        let mut record = LockRecord::empty("user-1");
        record.verified = true;
        assert!(!record.is_verified_at(t0()));
    }
}
