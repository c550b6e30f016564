//! Domain events for the comment thread context.

use chrono::{DateTime, Utc};
use marginalia_core::error::DomainError;
use marginalia_core::event::{DomainEvent, StoredEvent};
use serde::{Deserialize, Serialize};

/// Stored type name of [`CommentCreated`].
pub const COMMENT_CREATED: &str = "COMMENT_CREATED";
/// Stored type name of [`CommentEdited`].
pub const COMMENT_EDITED: &str = "COMMENT_EDITED";
/// Stored type name of [`CommentDeleted`].
pub const COMMENT_DELETED: &str = "COMMENT_DELETED";

/// Emitted when a reader posts a new comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreated {
    /// The blog post the comment belongs to.
    pub blog_id: String,
    /// Globally unique comment id.
    pub comment_id: u64,
    /// Display name of the author.
    pub author: String,
    /// Comment body.
    pub comment: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}

/// Emitted when a comment's text is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentEdited {
    /// The blog post the comment belongs to.
    pub blog_id: String,
    /// The edited comment.
    pub comment_id: u64,
    /// Replacement body.
    pub comment: String,
    /// When the edit happened.
    pub edited_at: DateTime<Utc>,
}

/// Emitted when a comment is removed from its thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDeleted {
    /// The blog post the comment belonged to.
    pub blog_id: String,
    /// The deleted comment.
    pub comment_id: u64,
    /// When the deletion happened.
    pub deleted_at: DateTime<Utc>,
}

/// Event variants of the comment thread context.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentEvent {
    /// A comment was posted.
    Created(CommentCreated),
    /// A comment was edited.
    Edited(CommentEdited),
    /// A comment was deleted.
    Deleted(CommentDeleted),
}

fn decode<T: for<'de> Deserialize<'de>>(stored: &StoredEvent) -> Result<T, DomainError> {
    serde_json::from_value(stored.payload.clone()).map_err(|e| {
        DomainError::Infrastructure(format!(
            "event deserialization failed for {}: {e}",
            stored.event_type
        ))
    })
}

impl DomainEvent for CommentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CommentEvent::Created(_) => COMMENT_CREATED,
            CommentEvent::Edited(_) => COMMENT_EDITED,
            CommentEvent::Deleted(_) => COMMENT_DELETED,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        let value = match self {
            CommentEvent::Created(payload) => serde_json::to_value(payload),
            CommentEvent::Edited(payload) => serde_json::to_value(payload),
            CommentEvent::Deleted(payload) => serde_json::to_value(payload),
        };
        value.expect("comment event serialization is infallible")
    }

    fn from_stored(stored: &StoredEvent) -> Result<Option<Self>, DomainError> {
        let event = match stored.event_type.as_str() {
            COMMENT_CREATED => CommentEvent::Created(decode(stored)?),
            COMMENT_EDITED => CommentEvent::Edited(decode(stored)?),
            COMMENT_DELETED => CommentEvent::Deleted(decode(stored)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}
