use async_trait::async_trait;
use aws_sdk_dynamodb::{error::DisplayErrorContext, types::AttributeValue, Client as DynamoClient};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::{
    parse_timestamp, AppError, AppResult, GuestbookEntry, GuestbookStore, LockRecord, LockStore,
    Note, NoteStore, NoteUpdate, ANONYMOUS,
};

type Item = HashMap<String, AttributeValue>;

/// DynamoDB adapter for a single table.
///
/// Which store trait is meaningful depends on the table it was built with:
/// the guestbook table is keyed by `id`, the notes table by
/// `(userId, noteId)` and the lock table by `userId`.
#[derive(Clone)]
pub struct DynamoDBService {
    client: DynamoClient,
    table_name: String,
}

impl DynamoDBService {
    pub fn new(client: DynamoClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// Create DynamoDBService from `TABLE_NAME`, falling back to `default_table`
    pub fn from_env(client: DynamoClient, default_table: &str) -> Self {
        let table_name = crate::resolve_table_name(default_table);
        tracing::info!("DynamoDBService initialized with table: {}", table_name);
        Self::new(client, table_name)
    }

    /// Create DynamoDBService from `TABLE_NAME`, which must be set
    pub fn from_required_env(client: DynamoClient) -> AppResult<Self> {
        let table_name = crate::required_env("TABLE_NAME")?;
        tracing::info!("DynamoDBService initialized with table: {}", table_name);
        Ok(Self::new(client, table_name))
    }

    async fn put(&self, item: Item) -> AppResult<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| AppError::DynamoDBError(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl GuestbookStore for DynamoDBService {
    async fn put_entry(&self, entry: &GuestbookEntry) -> AppResult<()> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(entry.id.clone()));
        item.insert("name".to_string(), AttributeValue::S(entry.name.clone()));
        item.insert("message".to_string(), AttributeValue::S(entry.message.clone()));
        item.insert("createdAt".to_string(), AttributeValue::S(entry.created_at.to_rfc3339()));

        self.put(item).await
    }

    async fn scan_entries(&self) -> AppResult<Vec<GuestbookEntry>> {
        let mut entries = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let result = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| AppError::DynamoDBError(DisplayErrorContext(&e).to_string()))?;

            for item in result.items.unwrap_or_default() {
                entries.push(parse_entry_from_item(&item)?);
            }

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(entries)
    }
}

#[async_trait]
impl NoteStore for DynamoDBService {
    async fn put_note(&self, note: &Note) -> AppResult<()> {
        let mut item = HashMap::new();
        item.insert("userId".to_string(), AttributeValue::S(note.user_id.clone()));
        item.insert("noteId".to_string(), AttributeValue::S(note.note_id.clone()));
        item.insert("title".to_string(), AttributeValue::S(note.title.clone()));
        item.insert("content".to_string(), AttributeValue::S(note.content.clone()));
        item.insert("isArchived".to_string(), AttributeValue::Bool(note.is_archived));
        item.insert("isLocked".to_string(), AttributeValue::Bool(note.is_locked));
        item.insert("isPinned".to_string(), AttributeValue::Bool(note.is_pinned));
        item.insert("isDeleted".to_string(), AttributeValue::Bool(note.is_deleted));
        item.insert("createdAt".to_string(), AttributeValue::S(note.created_at.to_rfc3339()));
        item.insert("updatedAt".to_string(), AttributeValue::S(note.updated_at.to_rfc3339()));

        self.put(item).await
    }

    async fn query_notes(&self, user_id: &str) -> AppResult<Vec<Note>> {
        let mut notes = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("userId = :userId")
                .expression_attribute_values(":userId", AttributeValue::S(user_id.to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| AppError::DynamoDBError(DisplayErrorContext(&e).to_string()))?;

            for item in result.items.unwrap_or_default() {
                notes.push(parse_note_from_item(&item)?);
            }

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(notes)
    }

    async fn update_note(
        &self,
        user_id: &str,
        note_id: &str,
        update: &NoteUpdate,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let (update_expression, names, values) = note_update_expression(update, updated_at);

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("userId", AttributeValue::S(user_id.to_string()))
            .key("noteId", AttributeValue::S(note_id.to_string()))
            .update_expression(update_expression)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .condition_expression("attribute_exists(noteId)")
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    AppError::NoteNotFound(note_id.to_string())
                } else {
                    AppError::DynamoDBError(DisplayErrorContext(&service_error).to_string())
                }
            })?;

        Ok(())
    }

    async fn delete_note(&self, user_id: &str, note_id: &str) -> AppResult<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("userId", AttributeValue::S(user_id.to_string()))
            .key("noteId", AttributeValue::S(note_id.to_string()))
            .send()
            .await
            .map_err(|e| AppError::DynamoDBError(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl LockStore for DynamoDBService {
    async fn get_lock(&self, user_id: &str) -> AppResult<Option<LockRecord>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("userId", AttributeValue::S(user_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| AppError::DynamoDBError(DisplayErrorContext(&e).to_string()))?;

        match result.item {
            Some(item) => Ok(Some(parse_lock_from_item(&item)?)),
            None => Ok(None),
        }
    }

    async fn open_verification_window(&self, user_id: &str, until: DateTime<Utc>) -> AppResult<()> {
        let (update_expression, values) = verification_window_expression(until);

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("userId", AttributeValue::S(user_id.to_string()))
            .update_expression(update_expression)
            .set_expression_attribute_values(Some(values))
            .send()
            .await
            .map_err(|e| AppError::DynamoDBError(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    async fn set_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
        updated_at: DateTime<Utc>,
        consume_window: bool,
    ) -> AppResult<()> {
        let (update_expression, values) =
            password_hash_expression(password_hash, updated_at, consume_window);

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("userId", AttributeValue::S(user_id.to_string()))
            .update_expression(update_expression)
            .set_expression_attribute_values(Some(values))
            .send()
            .await
            .map_err(|e| AppError::DynamoDBError(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}

fn verification_window_expression(until: DateTime<Utc>) -> (&'static str, Item) {
    let mut values = HashMap::new();
    values.insert(":verified".to_string(), AttributeValue::Bool(true));
    values.insert(":verifiedUntil".to_string(), AttributeValue::S(until.to_rfc3339()));

    ("SET verified = :verified, verifiedUntil = :verifiedUntil", values)
}

/// Replace the lock hash. Consuming the window removes the verification
/// attributes in the same write, so one verification allows one change.
fn password_hash_expression(
    password_hash: &str,
    updated_at: DateTime<Utc>,
    consume_window: bool,
) -> (&'static str, Item) {
    let mut values = HashMap::new();
    values.insert(":hash".to_string(), AttributeValue::S(password_hash.to_string()));
    values.insert(":updatedAt".to_string(), AttributeValue::S(updated_at.to_rfc3339()));

    let expression = if consume_window {
        "SET lockedPasswordHash = :hash, updatedAt = :updatedAt REMOVE verified, verifiedUntil"
    } else {
        "SET lockedPasswordHash = :hash, updatedAt = :updatedAt"
    };
    (expression, values)
}

/// Build `SET` clauses for the fields present in `update`. `updatedAt` is
/// always written; `createdAt` never is.
fn note_update_expression(
    update: &NoteUpdate,
    updated_at: DateTime<Utc>,
) -> (String, HashMap<String, String>, Item) {
    let mut clauses = Vec::new();
    let mut names = HashMap::new();
    let mut values = HashMap::new();

    let mut set = |attribute: &str, value: AttributeValue| {
        clauses.push(format!("#{attribute} = :{attribute}"));
        names.insert(format!("#{attribute}"), attribute.to_string());
        values.insert(format!(":{attribute}"), value);
    };

    if let Some(title) = &update.title {
        set("title", AttributeValue::S(title.clone()));
    }
    if let Some(content) = &update.content {
        set("content", AttributeValue::S(content.clone()));
    }
    if let Some(is_archived) = update.is_archived {
        set("isArchived", AttributeValue::Bool(is_archived));
    }
    if let Some(is_locked) = update.is_locked {
        set("isLocked", AttributeValue::Bool(is_locked));
    }
    if let Some(is_pinned) = update.is_pinned {
        set("isPinned", AttributeValue::Bool(is_pinned));
    }
    if let Some(is_deleted) = update.is_deleted {
        set("isDeleted", AttributeValue::Bool(is_deleted));
    }
    set("updatedAt", AttributeValue::S(updated_at.to_rfc3339()));

    (format!("SET {}", clauses.join(", ")), names, values)
}

fn required_s(item: &Item, name: &str) -> AppResult<String> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| AppError::InternalError(format!("Missing {}", name)))
}

fn optional_s(item: &Item, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn optional_bool(item: &Item, name: &str) -> bool {
    item.get(name)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .unwrap_or(false)
}

fn required_timestamp(item: &Item, name: &str) -> AppResult<DateTime<Utc>> {
    let raw = required_s(item, name)?;
    parse_timestamp(&raw)
        .ok_or_else(|| AppError::InternalError(format!("Invalid {}: {}", name, raw)))
}

fn optional_timestamp(item: &Item, name: &str) -> AppResult<Option<DateTime<Utc>>> {
    match optional_s(item, name) {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| AppError::InternalError(format!("Invalid {}: {}", name, raw))),
        None => Ok(None),
    }
}

fn parse_entry_from_item(item: &Item) -> AppResult<GuestbookEntry> {
    Ok(GuestbookEntry {
        id: required_s(item, "id")?,
        name: optional_s(item, "name").unwrap_or_else(|| ANONYMOUS.to_string()),
        message: required_s(item, "message")?,
        created_at: required_timestamp(item, "createdAt")?,
    })
}

fn parse_note_from_item(item: &Item) -> AppResult<Note> {
    Ok(Note {
        user_id: required_s(item, "userId")?,
        note_id: required_s(item, "noteId")?,
        title: optional_s(item, "title").unwrap_or_default(),
        content: optional_s(item, "content").unwrap_or_default(),
        is_archived: optional_bool(item, "isArchived"),
        is_locked: optional_bool(item, "isLocked"),
        is_pinned: optional_bool(item, "isPinned"),
        is_deleted: optional_bool(item, "isDeleted"),
        created_at: required_timestamp(item, "createdAt")?,
        updated_at: required_timestamp(item, "updatedAt")?,
    })
}

fn parse_lock_from_item(item: &Item) -> AppResult<LockRecord> {
    Ok(LockRecord {
        user_id: required_s(item, "userId")?,
        locked_password_hash: optional_s(item, "lockedPasswordHash"),
        verified: optional_bool(item, "verified"),
        verified_until: optional_timestamp(item, "verifiedUntil")?,
        updated_at: optional_timestamp(item, "updatedAt")?,
    })
}
