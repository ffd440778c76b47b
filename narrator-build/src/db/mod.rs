//! Narration database persistence
//!
//! Schema creation lives in `narrator_common::db`; this module writes the
//! assembled messages into it.

pub mod store;

pub use store::*;
