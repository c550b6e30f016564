//! Route modules.

pub mod comments;
pub mod health;
