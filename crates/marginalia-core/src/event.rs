//! Domain event abstractions.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Stored representation of a domain event: one entry of an event log.
///
/// Serialized as `{"type": "...", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Event type name for deserialization routing.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
}

impl StoredEvent {
    /// Encodes the envelope as the string written to the store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if serialization fails.
    pub fn encode(&self) -> Result<String, DomainError> {
        serde_json::to_string(self)
            .map_err(|e| DomainError::Infrastructure(format!("event serialization failed: {e}")))
    }

    /// Decodes an envelope read back from the store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the entry is not a valid envelope.
    pub fn decode(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw)
            .map_err(|e| DomainError::Infrastructure(format!("event deserialization failed: {e}")))
    }
}

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug + Sized {
    /// Returns the event type name (used for serialization routing).
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Rebuilds an event from its stored envelope.
    ///
    /// Returns `Ok(None)` for event types this context does not know, so
    /// older readers skip events written by newer writers.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a known event type carries a
    /// payload that does not deserialize.
    fn from_stored(stored: &StoredEvent) -> Result<Option<Self>, DomainError>;

    /// Wraps this event in its storage envelope.
    fn to_stored(&self) -> StoredEvent {
        StoredEvent {
            event_type: self.event_type().to_owned(),
            payload: self.to_payload(),
        }
    }
}
