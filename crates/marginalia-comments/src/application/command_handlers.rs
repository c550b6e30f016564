//! Command handlers for the comment thread context.
//!
//! Each handler turns a validated command into exactly one event and appends
//! it to the post's log. Handlers never read the log back.

use marginalia_core::clock::Clock;
use marginalia_core::error::DomainError;
use marginalia_core::event::DomainEvent;
use marginalia_core::repository::EventRepository;

use crate::domain::aggregates::CommentAggregate;
use crate::domain::commands::{AddComment, DeleteComment, EditComment};
use crate::domain::events::{CommentCreated, CommentDeleted, CommentEdited, CommentEvent};
use crate::domain::{COMMENT_ID_SEQUENCE, comment_stream};

async fn append(
    repo: &dyn EventRepository,
    blog_id: &str,
    event: &CommentEvent,
) -> Result<(), DomainError> {
    repo.append_event(&comment_stream(blog_id), &event.to_stored())
        .await
}

/// Handles the `AddComment` command: draws a new comment id, appends a
/// `CommentCreated` event and returns the new comment.
///
/// The id draw and the append are separate store calls; if the append fails
/// the id is simply never used.
///
/// # Errors
///
/// Returns `DomainError` if the id draw or the append fails.
pub async fn handle_add_comment(
    command: &AddComment,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CommentAggregate, DomainError> {
    let comment_id = repo.next_id(COMMENT_ID_SEQUENCE).await?;

    let created = CommentCreated {
        blog_id: command.blog_id.clone(),
        comment_id,
        author: command.author.clone(),
        comment: command.comment.clone(),
        created_at: clock.now(),
    };
    let aggregate = CommentAggregate::from(&created);

    append(repo, &command.blog_id, &CommentEvent::Created(created)).await?;

    Ok(aggregate)
}

/// Handles the `EditComment` command by appending a `CommentEdited` event.
///
/// # Errors
///
/// Returns `DomainError` if the append fails.
pub async fn handle_edit_comment(
    command: &EditComment,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CommentEdited, DomainError> {
    let edited = CommentEdited {
        blog_id: command.blog_id.clone(),
        comment_id: command.comment_id,
        comment: command.comment.clone(),
        edited_at: clock.now(),
    };

    append(repo, &command.blog_id, &CommentEvent::Edited(edited.clone())).await?;

    Ok(edited)
}

/// Handles the `DeleteComment` command by appending a `CommentDeleted` event.
///
/// # Errors
///
/// Returns `DomainError` if the append fails.
pub async fn handle_delete_comment(
    command: &DeleteComment,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CommentDeleted, DomainError> {
    let deleted = CommentDeleted {
        blog_id: command.blog_id.clone(),
        comment_id: command.comment_id,
        deleted_at: clock.now(),
    };

    append(repo, &command.blog_id, &CommentEvent::Deleted(deleted.clone())).await?;

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use marginalia_core::repository::{EventRepository, StoreEventRepository};
    use uuid::Uuid;

    use crate::application::command_handlers::{
        handle_add_comment, handle_delete_comment, handle_edit_comment,
    };
    use crate::domain::commands::{AddComment, DeleteComment, EditComment};
    use crate::domain::events::{COMMENT_CREATED, COMMENT_DELETED, COMMENT_EDITED};
    use marginalia_test_support::{FailingStore, FixedClock, InMemoryStore};

    fn add(blog_id: &str, text: &str) -> AddComment {
        AddComment {
            correlation_id: Uuid::new_v4(),
            blog_id: blog_id.to_owned(),
            author: "Ada".to_owned(),
            comment: text.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_handle_add_comment_persists_comment_created_event() {
        // Arrange
        let fixed_now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let clock = FixedClock(fixed_now);
        let store = Arc::new(InMemoryStore::new());
        let repo = StoreEventRepository::new(store.clone());

        // Act
        let aggregate = handle_add_comment(&add("hello-world", "Nice!"), &clock, &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(aggregate.comment_id, 1);
        assert_eq!(aggregate.timestamp, fixed_now);
        assert!(!aggregate.is_edited);

        let events = repo.load_events("blog:hello-world:comments").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, COMMENT_CREATED);
        assert_eq!(events[0].payload["commentId"], 1);
        assert_eq!(events[0].payload["comment"], "Nice!");
    }

    #[tokio::test]
    async fn test_comment_ids_increase_across_blogs() {
        let clock = FixedClock(Utc::now());
        let repo = StoreEventRepository::new(Arc::new(InMemoryStore::new()));

        let mut previous = 0;
        for blog_id in ["a", "b", "a", "c", "b"] {
            let aggregate = handle_add_comment(&add(blog_id, "hi"), &clock, &repo)
                .await
                .unwrap();
            assert!(aggregate.comment_id > previous);
            previous = aggregate.comment_id;
        }
    }

    #[tokio::test]
    async fn test_handle_edit_comment_appends_edit_event() {
        let fixed_now = Utc.with_ymd_and_hms(2026, 1, 15, 11, 0, 0).unwrap();
        let clock = FixedClock(fixed_now);
        let repo = StoreEventRepository::new(Arc::new(InMemoryStore::new()));
        let command = EditComment {
            correlation_id: Uuid::new_v4(),
            blog_id: "hello-world".to_owned(),
            comment_id: 3,
            comment: "better wording".to_owned(),
        };

        let edited = handle_edit_comment(&command, &clock, &repo).await.unwrap();

        assert_eq!(edited.edited_at, fixed_now);
        let events = repo.load_events("blog:hello-world:comments").await.unwrap();
        assert_eq!(events[0].event_type, COMMENT_EDITED);
        assert_eq!(events[0].payload["comment"], "better wording");
    }

    #[tokio::test]
    async fn test_handle_delete_comment_appends_delete_event() {
        let clock = FixedClock(Utc::now());
        let repo = StoreEventRepository::new(Arc::new(InMemoryStore::new()));
        let command = DeleteComment {
            correlation_id: Uuid::new_v4(),
            blog_id: "hello-world".to_owned(),
            comment_id: 3,
        };

        let deleted = handle_delete_comment(&command, &clock, &repo).await.unwrap();

        assert_eq!(deleted.comment_id, 3);
        let events = repo.load_events("blog:hello-world:comments").await.unwrap();
        assert_eq!(events[0].event_type, COMMENT_DELETED);
    }

    #[tokio::test]
    async fn test_handle_add_comment_propagates_store_failure() {
        let clock = FixedClock(Utc::now());
        let repo = StoreEventRepository::new(Arc::new(FailingStore));

        let result = handle_add_comment(&add("hello-world", "hi"), &clock, &repo).await;

        assert!(result.is_err());
    }
}
