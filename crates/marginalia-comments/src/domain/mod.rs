//! Domain model for comment threads.

pub mod aggregates;
pub mod commands;
pub mod events;

/// Global sequence that hands out comment ids across every blog post.
pub const COMMENT_ID_SEQUENCE: &str = "commentId";

/// Returns the event log key for a blog post's comment thread.
#[must_use]
pub fn comment_stream(blog_id: &str) -> String {
    format!("blog:{blog_id}:comments")
}
