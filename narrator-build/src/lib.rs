//! # narrator-build
//!
//! Builds the pre-recorded narration database for one language:
//! - Placeholder grammar and template tokenizer (tag strings)
//! - Audio artifact builder over an external toolchain (espeak, sox, oggenc, ogginfo)
//! - Catalog loading and merging
//! - Natural-key persistence into the narration database

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod grammar;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod tokenizer;

pub use error::{ArtifactError, BuildError, BuildResult, ValidationError};
