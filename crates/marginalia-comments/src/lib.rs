//! Marginalia — blog comment thread bounded context.
//!
//! Comments are event-sourced: every add, edit and delete appends an event to
//! the post's log, and the visible thread is recomputed from that log on
//! every read.

pub mod application;
pub mod domain;
