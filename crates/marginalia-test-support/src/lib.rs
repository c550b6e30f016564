//! Shared test fakes and utilities for the Marginalia comment service.

mod clock;
mod store;

pub use clock::FixedClock;
pub use store::{FailingStore, InMemoryStore};
