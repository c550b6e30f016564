//! Read-side projection abstraction.

use crate::error::DomainError;
use crate::event::{DomainEvent, StoredEvent};

/// A view that is rebuilt from scratch by folding an event log.
///
/// Projections are never persisted; they are recomputed on every read.
pub trait Projection: Default + Send + Sync {
    /// The event type this projection consumes.
    type Event: DomainEvent;

    /// Apply a single event to the view.
    fn apply(&mut self, event: &Self::Event);

    /// Folds already-decoded events, left to right.
    fn replay<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a Self::Event>,
        Self::Event: 'a,
    {
        let mut view = Self::default();
        for event in events {
            view.apply(event);
        }
        view
    }

    /// Decodes and folds stored envelopes in the order given. Envelopes of
    /// unknown type are skipped.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a known event fails to decode.
    fn replay_stored(stored: &[StoredEvent]) -> Result<Self, DomainError> {
        let mut view = Self::default();
        for envelope in stored {
            match Self::Event::from_stored(envelope)? {
                Some(event) => view.apply(&event),
                None => {
                    tracing::debug!(event_type = %envelope.event_type, "skipping unknown event type");
                }
            }
        }
        Ok(view)
    }
}
