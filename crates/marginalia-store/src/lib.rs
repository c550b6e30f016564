//! Marginalia Store — remote key-value store client.
//!
//! Implements `marginalia_core::store::KeyValueStore` against a hosted Redis
//! that exposes the Upstash REST protocol.

pub mod upstash;

pub use upstash::{StoreError, UpstashStore};
