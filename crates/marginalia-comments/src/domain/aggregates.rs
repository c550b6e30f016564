//! Comment aggregates and the thread projection that produces them.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use marginalia_core::projection::Projection;
use serde::Serialize;

use super::events::{CommentCreated, CommentEvent};

/// Current state of a single comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAggregate {
    /// The blog post the comment belongs to.
    pub blog_id: String,
    /// Globally unique comment id.
    pub comment_id: u64,
    /// Display name of the author.
    pub author: String,
    /// Current comment body.
    pub comment: String,
    /// Whether the body has been replaced since it was posted.
    pub is_edited: bool,
    /// Time of the latest creation or edit.
    pub timestamp: DateTime<Utc>,
}

impl From<&CommentCreated> for CommentAggregate {
    fn from(created: &CommentCreated) -> Self {
        Self {
            blog_id: created.blog_id.clone(),
            comment_id: created.comment_id,
            author: created.author.clone(),
            comment: created.comment.clone(),
            is_edited: false,
            timestamp: created.created_at,
        }
    }
}

/// The visible comments of one blog post, keyed by comment id.
///
/// Entries keep the position of their first insertion; edits update in place
/// and deletions close the gap.
#[derive(Debug, Default)]
pub struct CommentThread {
    comments: IndexMap<u64, CommentAggregate>,
}

impl CommentThread {
    /// Returns the comment with the given id, if it is visible.
    #[must_use]
    pub fn get(&self, comment_id: u64) -> Option<&CommentAggregate> {
        self.comments.get(&comment_id)
    }

    /// Number of visible comments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    /// Whether the thread has no visible comments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Consumes the thread, yielding comments in insertion order.
    #[must_use]
    pub fn into_comments(self) -> Vec<CommentAggregate> {
        self.comments.into_values().collect()
    }
}

impl Projection for CommentThread {
    type Event = CommentEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CommentEvent::Created(payload) => {
                self.comments
                    .insert(payload.comment_id, CommentAggregate::from(payload));
            }
            CommentEvent::Edited(payload) => {
                // Edits of unknown or deleted comments have nothing to update.
                if let Some(existing) = self.comments.get_mut(&payload.comment_id) {
                    existing.comment.clone_from(&payload.comment);
                    existing.timestamp = payload.edited_at;
                    existing.is_edited = true;
                }
            }
            CommentEvent::Deleted(payload) => {
                self.comments.shift_remove(&payload.comment_id);
            }
        }
    }
}
