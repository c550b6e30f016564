//! Marginalia Core — shared domain abstractions.
//!
//! This crate defines the traits and types the comment context and the API
//! server depend on: the event envelope, the remote key-value store seam,
//! the event repository built on top of it, and the error taxonomy. It
//! contains no transport code.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod projection;
pub mod repository;
pub mod store;
