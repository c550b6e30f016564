//! Event repository abstraction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DomainError;
use crate::event::StoredEvent;
use crate::store::KeyValueStore;

/// Repository trait for loading and appending domain events.
///
/// A stream is identified by its store key, e.g. `blog:{blogId}:comments`.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Load all events of a stream, oldest first.
    async fn load_events(&self, stream: &str) -> Result<Vec<StoredEvent>, DomainError>;

    /// Append one event to the end of a stream.
    async fn append_event(&self, stream: &str, event: &StoredEvent) -> Result<(), DomainError>;

    /// Draws the next value of a global, strictly increasing sequence.
    ///
    /// Not transactional with `append_event`: a failure between the two
    /// leaves a gap in the sequence.
    async fn next_id(&self, sequence: &str) -> Result<u64, DomainError>;
}

/// `EventRepository` backed by Redis lists on a `KeyValueStore`.
///
/// Events are written with `LPUSH`, so the raw list is newest-first; reads
/// reverse it to hand callers the append order.
#[derive(Clone)]
pub struct StoreEventRepository {
    store: Arc<dyn KeyValueStore>,
}

impl StoreEventRepository {
    /// Creates a repository over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for StoreEventRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreEventRepository").finish_non_exhaustive()
    }
}

#[async_trait]
impl EventRepository for StoreEventRepository {
    async fn load_events(&self, stream: &str) -> Result<Vec<StoredEvent>, DomainError> {
        let raw = self.store.lrange(stream, 0, -1).await?;
        raw.iter().rev().map(|entry| StoredEvent::decode(entry)).collect()
    }

    async fn append_event(&self, stream: &str, event: &StoredEvent) -> Result<(), DomainError> {
        let encoded = event.encode()?;
        let length = self.store.lpush(stream, &encoded).await?;
        tracing::debug!(stream, length, event_type = %event.event_type, "event appended");
        Ok(())
    }

    async fn next_id(&self, sequence: &str) -> Result<u64, DomainError> {
        let value = self.store.incr(sequence).await?;
        u64::try_from(value).map_err(|_| {
            DomainError::Infrastructure(format!("sequence {sequence} returned negative value {value}"))
        })
    }
}
