//! Catalog message

use crate::error::{BuildError, ValidationError};
use crate::models::Translation;
use std::fmt;
use std::str::FromStr;

/// Closed set of message classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageClass {
    Prompt,
    Announcement,
    Number,
    Date,
}

impl MessageClass {
    pub const ALL: [MessageClass; 4] = [
        MessageClass::Prompt,
        MessageClass::Announcement,
        MessageClass::Number,
        MessageClass::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageClass::Prompt => "prompt",
            MessageClass::Announcement => "announcement",
            MessageClass::Number => "number",
            MessageClass::Date => "date",
        }
    }
}

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageClass::ALL
            .iter()
            .copied()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// A message and its translation for the language being built
#[derive(Debug, Clone)]
pub struct Message {
    /// Original text, the lookup key at runtime
    pub key: String,
    /// Raw class text; checked against `MessageClass` on validation
    pub class: String,
    /// Numeric catalog identifier
    pub id: i64,
    pub translation: Translation,
}

impl Message {
    pub fn new(key: impl Into<String>, class: impl Into<String>, id: i64, translation: Translation) -> Self {
        Self {
            key: key.into(),
            class: class.into(),
            id,
            translation,
        }
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        let wrap = |source| BuildError::Validation {
            key: self.key.clone(),
            source,
        };
        if self.key.is_empty() {
            return Err(wrap(ValidationError::MissingField {
                entity: "message",
                field: "key",
            }));
        }
        if self.class.parse::<MessageClass>().is_err() {
            return Err(wrap(ValidationError::InvalidMessageClass {
                key: self.key.clone(),
                class: self.class.clone(),
            }));
        }
        self.translation.validate().map_err(wrap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_class_rejected() {
        let translation = Translation::new("en", "Hello", "Hello", Vec::new());
        let message = Message::new("Hello", "greeting", 1, translation);
        let err = message.validate().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Validation {
                source: ValidationError::InvalidMessageClass { .. },
                ..
            }
        ));
        assert!(err.to_string().ends_with("in message 'Hello'"));
    }

    #[test]
    fn test_unrendered_clip_fails_validation() {
        let translation = Translation::new("en", "Hello", "Hello", Vec::new());
        let message = Message::new("Hello", "prompt", 1, translation);
        assert!(matches!(
            message.validate(),
            Err(BuildError::Validation {
                source: ValidationError::MissingField { entity: "audio", .. },
                ..
            })
        ));
    }
}
