//! Narration entities
//!
//! A `Message` owns exactly one `Translation`, which owns its `Parameter`s
//! and one `AudioClip` per literal segment.

pub mod audio;
pub mod keys;
pub mod message;
pub mod parameter;
pub mod translation;

pub use audio::{AudioClip, ContainerFormat};
pub use keys::{AudioKey, MessageKey, ParameterKey, TranslationKey};
pub use message::{Message, MessageClass};
pub use parameter::Parameter;
pub use translation::Translation;
