//! Shared application state.

use std::sync::Arc;

use marginalia_comments::domain::commands::CommentLimits;
use marginalia_core::clock::Clock;
use marginalia_core::repository::{EventRepository, StoreEventRepository};
use marginalia_core::store::KeyValueStore;

use crate::rate_limit::RateLimit;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for event timestamps and rate-limit windows.
    pub clock: Arc<dyn Clock>,
    /// Remote key-value store (feature flags live here too).
    pub store: Arc<dyn KeyValueStore>,
    /// Event repository over `store`.
    pub event_repository: Arc<dyn EventRepository>,
    /// Length bounds for comment input.
    pub limits: CommentLimits,
    /// Budget for `add-comment` per client IP.
    pub add_comment_rate_limit: RateLimit,
}

impl AppState {
    /// Create new application state; the event repository is layered over
    /// `store`.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        store: Arc<dyn KeyValueStore>,
        limits: CommentLimits,
        add_comment_rate_limit: RateLimit,
    ) -> Self {
        let event_repository = Arc::new(StoreEventRepository::new(Arc::clone(&store)));
        Self {
            clock,
            store,
            event_repository,
            limits,
            add_comment_rate_limit,
        }
    }
}
