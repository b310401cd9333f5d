// Guestbook add/list against the in-memory store
// Run with: cargo test -p serverless-shared --test guestbook_test

use chrono::{TimeZone, Utc};
use serverless_shared::{AddMessageRequest, AppError, GuestbookService, InMemoryStore, ManualClock};

fn service() -> GuestbookService<InMemoryStore, ManualClock> {
    GuestbookService::new(
        InMemoryStore::new(),
        ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 14, 18, 0, 0).unwrap()),
    )
}

fn request(name: Option<&str>, message: Option<&str>) -> AddMessageRequest {
    AddMessageRequest {
        name: name.map(str::to_string),
        message: message.map(str::to_string),
    }
}

#[tokio::test]
async fn test_added_message_is_listed() {
    let service = service();

    service
        .add_message(request(Some("Ada"), Some("Lovely site")))
        .await
        .unwrap();
    service
        .add_message(request(Some("Grace"), Some("Nice work")))
        .await
        .unwrap();

    let entries = service.list_messages().await.unwrap();

    assert_eq!(entries.len(), 2);
    assert!(entries
        .iter()
        .any(|e| e.name == "Ada" && e.message == "Lovely site"));
    assert!(entries
        .iter()
        .any(|e| e.name == "Grace" && e.message == "Nice work"));
}

#[tokio::test]
async fn test_message_is_trimmed() {
    let service = service();

    let entry = service
        .add_message(request(Some("  Ada "), Some("  hello  \n")))
        .await
        .unwrap();

    assert_eq!(entry.message, "hello");
    assert_eq!(entry.name, "Ada");
    assert_eq!(
        entry.created_at,
        Utc.with_ymd_and_hms(2024, 2, 14, 18, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_name_defaults_to_anonymous() {
    let service = service();

    let missing = service.add_message(request(None, Some("hi"))).await.unwrap();
    let blank = service.add_message(request(Some("   "), Some("hi"))).await.unwrap();

    assert_eq!(missing.name, "Anonymous");
    assert_eq!(blank.name, "Anonymous");
    assert_ne!(missing.id, blank.id);
}

#[tokio::test]
async fn test_empty_or_whitespace_message_is_rejected() {
    let service = service();

    for message in [None, Some(""), Some("   "), Some("\t\n")] {
        for name in [None, Some("Ada")] {
            let result = service.add_message(request(name, message)).await;
            assert!(
                matches!(result, Err(AppError::ValidationError(ref msg)) if msg == "Message is required"),
                "message {:?} with name {:?} should be rejected",
                message,
                name
            );
        }
    }

    assert!(service.list_messages().await.unwrap().is_empty());
}
