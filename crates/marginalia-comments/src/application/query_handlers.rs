//! Query handlers for the comment thread context.

use marginalia_core::error::DomainError;
use marginalia_core::projection::Projection;
use marginalia_core::repository::EventRepository;

use crate::domain::aggregates::{CommentAggregate, CommentThread};
use crate::domain::commands::GetComments;
use crate::domain::comment_stream;

/// Replays a post's event log and returns its visible comments in insertion
/// order. A post without events has an empty thread.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if loading or decoding events fails.
pub async fn get_comments(
    query: &GetComments,
    repo: &dyn EventRepository,
) -> Result<Vec<CommentAggregate>, DomainError> {
    let stored_events = repo.load_events(&comment_stream(&query.blog_id)).await?;
    let thread = CommentThread::replay_stored(&stored_events)?;
    tracing::debug!(
        blog_id = %query.blog_id,
        events = stored_events.len(),
        comments = thread.len(),
        "comment thread projected"
    );
    Ok(thread.into_comments())
}
