//! Remote key-value store abstraction.
//!
//! Mirrors the handful of Redis commands the comment service needs. The
//! production implementation speaks the Upstash REST protocol; tests use an
//! in-memory fake.

use async_trait::async_trait;

use crate::error::DomainError;

/// The subset of Redis operations used by the service.
///
/// Every method is a single round trip with no retries; implementations
/// report transport and protocol failures as `DomainError::Infrastructure`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// `INCR key`: atomically increments the integer at `key` and returns
    /// the new value. A missing key counts as `0`.
    async fn incr(&self, key: &str) -> Result<i64, DomainError>;

    /// `LPUSH key value`: prepends `value` to the list at `key` and returns
    /// the new length.
    async fn lpush(&self, key: &str, value: &str) -> Result<i64, DomainError>;

    /// `LRANGE key start stop`: returns the inclusive slice of the list,
    /// with Redis semantics for negative indexes.
    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, DomainError>;

    /// `HGET key field`: returns the hash field value, if any.
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, DomainError>;
}
