//! Tests for the list-backed event repository.

use std::sync::Arc;

use marginalia_core::error::DomainError;
use marginalia_core::event::StoredEvent;
use marginalia_core::repository::{EventRepository, StoreEventRepository};
use marginalia_test_support::{FailingStore, InMemoryStore};

fn event(kind: &str, n: u64) -> StoredEvent {
    StoredEvent {
        event_type: kind.to_owned(),
        payload: serde_json::json!({ "n": n }),
    }
}

#[tokio::test]
async fn test_load_events_returns_append_order() {
    // Arrange
    let store = Arc::new(InMemoryStore::new());
    let repo = StoreEventRepository::new(store.clone());

    // Act
    repo.append_event("blog:a:comments", &event("FIRST", 1)).await.unwrap();
    repo.append_event("blog:a:comments", &event("SECOND", 2)).await.unwrap();
    let loaded = repo.load_events("blog:a:comments").await.unwrap();

    // Assert
    assert_eq!(loaded, vec![event("FIRST", 1), event("SECOND", 2)]);
    // The raw list is newest-first because appends use LPUSH.
    let raw = store.list("blog:a:comments");
    assert!(raw[0].contains("SECOND"));
}

#[tokio::test]
async fn test_streams_are_isolated() {
    let repo = StoreEventRepository::new(Arc::new(InMemoryStore::new()));

    repo.append_event("blog:a:comments", &event("X", 1)).await.unwrap();

    assert!(repo.load_events("blog:b:comments").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_next_id_is_strictly_increasing() {
    let repo = StoreEventRepository::new(Arc::new(InMemoryStore::new().with_counter("commentId", 41)));

    let first = repo.next_id("commentId").await.unwrap();
    let second = repo.next_id("commentId").await.unwrap();

    assert_eq!(first, 42);
    assert_eq!(second, 43);
}

#[tokio::test]
async fn test_negative_sequence_value_is_infrastructure_error() {
    let repo = StoreEventRepository::new(Arc::new(InMemoryStore::new().with_counter("commentId", -5)));

    let result = repo.next_id("commentId").await;

    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
}

#[tokio::test]
async fn test_corrupt_entry_fails_the_load() {
    let store = Arc::new(InMemoryStore::new());
    marginalia_core::store::KeyValueStore::lpush(&*store, "blog:a:comments", "not json")
        .await
        .unwrap();
    let repo = StoreEventRepository::new(store);

    let result = repo.load_events("blog:a:comments").await;

    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
}

#[tokio::test]
async fn test_store_failures_propagate() {
    let repo = StoreEventRepository::new(Arc::new(FailingStore));

    assert!(repo.load_events("blog:a:comments").await.is_err());
    assert!(repo.append_event("blog:a:comments", &event("X", 1)).await.is_err());
    assert!(repo.next_id("commentId").await.is_err());
}
