//! Natural keys
//!
//! A natural key identifies a row by its meaning rather than its rowid, so
//! the same input always maps onto the same stored row. Child keys carry
//! the rowid of their parent.

use crate::models::{AudioClip, Message, Parameter, Translation};

/// `message(string, class)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageKey {
    pub key: String,
    pub class: String,
}

/// `messagetranslation(message_id, translation, language)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationKey {
    pub message_id: i64,
    /// Type-stripped translation text
    pub text: String,
    pub language: String,
}

/// `messageparameter(message_id, key, type)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterKey {
    pub message_id: i64,
    pub name: String,
    pub kind: String,
}

/// `messageaudio(translation_id, tagid, text)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AudioKey {
    pub translation_id: i64,
    pub tag_id: u32,
    pub text: String,
}

impl Message {
    pub fn natural_key(&self) -> MessageKey {
        MessageKey {
            key: self.key.clone(),
            class: self.class.clone(),
        }
    }
}

impl Translation {
    pub fn natural_key(&self, message_id: i64) -> TranslationKey {
        TranslationKey {
            message_id,
            text: self.stored_text(),
            language: self.language.clone(),
        }
    }
}

impl Parameter {
    pub fn natural_key(&self, message_id: i64) -> ParameterKey {
        ParameterKey {
            message_id,
            name: self.name.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl AudioClip {
    pub fn natural_key(&self, translation_id: i64) -> AudioKey {
        AudioKey {
            translation_id,
            tag_id: self.tag_id,
            text: self.text.clone(),
        }
    }
}
