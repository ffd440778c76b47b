//! # Narrator Common Library
//!
//! Shared code for the narration asset tools:
//! - Error and result types
//! - Bootstrap configuration loading (TOML)
//! - Narration database initialization

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
