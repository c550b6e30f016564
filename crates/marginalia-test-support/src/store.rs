//! Test stores — fake `KeyValueStore` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use marginalia_core::error::DomainError;
use marginalia_core::store::KeyValueStore;

#[derive(Debug, Default)]
struct Data {
    counters: HashMap<String, i64>,
    lists: HashMap<String, Vec<String>>,
    hashes: HashMap<String, HashMap<String, String>>,
    writes: usize,
}

/// An in-memory store with Redis semantics for the operations the service
/// uses. Counts every mutating call so tests can assert that nothing was
/// written.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: Mutex<Data>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a hash field, e.g. a feature flag. Seeding does not count as a
    /// write.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_hash_field(self, key: &str, field: &str, value: &str) -> Self {
        self.data
            .lock()
            .unwrap()
            .hashes
            .entry(key.to_owned())
            .or_default()
            .insert(field.to_owned(), value.to_owned());
        self
    }

    /// Seeds a counter to a starting value.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_counter(self, key: &str, value: i64) -> Self {
        self.data
            .lock()
            .unwrap()
            .counters
            .insert(key.to_owned(), value);
        self
    }

    /// Returns a snapshot of the raw list at `key`, newest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.data
            .lock()
            .unwrap()
            .lists
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the number of mutating operations performed so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn write_count(&self) -> usize {
        self.data.lock().unwrap().writes
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn incr(&self, key: &str) -> Result<i64, DomainError> {
        let mut data = self.data.lock().unwrap();
        data.writes += 1;
        let counter = data.counters.entry(key.to_owned()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<i64, DomainError> {
        let mut data = self.data.lock().unwrap();
        data.writes += 1;
        let list = data.lists.entry(key.to_owned()).or_default();
        list.insert(0, value.to_owned());
        Ok(i64::try_from(list.len()).unwrap_or(i64::MAX))
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, DomainError> {
        let data = self.data.lock().unwrap();
        let Some(list) = data.lists.get(key) else {
            return Ok(Vec::new());
        };
        let len = i64::try_from(list.len()).unwrap_or(i64::MAX);
        let start = if start < 0 { (start + len).max(0) } else { start };
        let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };
        if start > stop || start >= len {
            return Ok(Vec::new());
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let slice = list[start as usize..=stop as usize].to_vec();
        Ok(slice)
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, DomainError> {
        let data = self.data.lock().unwrap();
        Ok(data.hashes.get(key).and_then(|h| h.get(field)).cloned())
    }
}

/// A store that fails every operation with an infrastructure error. Useful
/// for testing error-handling paths.
#[derive(Debug)]
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn incr(&self, _key: &str) -> Result<i64, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn lpush(&self, _key: &str, _value: &str) -> Result<i64, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn lrange(&self, _key: &str, _start: i64, _stop: i64) -> Result<Vec<String>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn hget(&self, _key: &str, _field: &str) -> Result<Option<String>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
