//! Translation of a message into one language

use crate::error::{BuildError, ValidationError};
use crate::grammar;
use crate::models::{AudioClip, Parameter};
use crate::tokenizer::{self, Tokenized};

/// A translated template with its parameters and recorded clips
#[derive(Debug, Clone)]
pub struct Translation {
    pub language: String,
    /// Original (source language) text of the message
    pub key: String,
    /// Translated template in typed form
    pub text: String,
    pub tokens: Tokenized,
    pub parameters: Vec<Parameter>,
    pub clips: Vec<AudioClip>,
}

impl Translation {
    /// Assemble a translation
    ///
    /// `basenames` are handed out one per literal segment, in segment order;
    /// segments beyond the supplied names get a text-derived file name.
    pub fn new<I>(language: &str, key: &str, text: &str, basenames: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let tokens = tokenizer::tokenize(text);
        let parameters = grammar::extract(text)
            .into_iter()
            .map(|(name, kind)| Parameter::new(name, kind))
            .collect();

        let mut basenames = basenames.into_iter();
        let clips = tokens
            .literals()
            .map(|(ordinal, literal)| AudioClip::new(ordinal, literal, basenames.next()))
            .collect();

        Self {
            language: language.to_string(),
            key: key.to_string(),
            text: text.to_string(),
            tokens,
            parameters,
            clips,
        }
    }

    /// Translation text as persisted: placeholders without their kind
    pub fn stored_text(&self) -> String {
        grammar::strip_type(&self.text)
    }

    /// Tag string for the runtime player
    pub fn tag_string(&self) -> String {
        self.tokens.tag_string()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = |field| ValidationError::MissingField {
            entity: "translation",
            field,
        };
        if self.language.is_empty() {
            return Err(missing("language"));
        }
        if self.text.is_empty() {
            return Err(missing("text"));
        }
        for parameter in &self.parameters {
            parameter.validate()?;
        }
        for clip in &self.clips {
            clip.validate()?;
        }
        Ok(())
    }

    /// Clip and key text used for a single resampled prompt
    ///
    /// Fails with `AmbiguousTag` when both the key and the translation have
    /// more than one literal segment.
    pub fn resample_source(&self) -> Result<(&AudioClip, String), BuildError> {
        let key_tokens = tokenizer::tokenize(&self.key);
        let key_literals: Vec<(u32, &str)> = key_tokens.literals().collect();

        if key_literals.len() > 1 && self.clips.len() > 1 {
            return Err(BuildError::AmbiguousTag {
                key: self.key.clone(),
                translation: self.text.clone(),
            });
        }

        match (key_literals.first(), self.clips.first()) {
            (Some((_, key_text)), Some(clip)) => Ok((clip, key_text.to_string())),
            _ => Err(BuildError::NoLiteralSegment {
                key: self.key.clone(),
            }),
        }
    }
}
