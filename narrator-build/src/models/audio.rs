//! Recorded clip for one literal segment

use crate::error::ValidationError;
use crate::services::artifact_builder::RenderedAudio;

/// Container of every stored clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerFormat {
    #[default]
    OggVorbis,
}

impl ContainerFormat {
    /// Value stored alongside the clip
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerFormat::OggVorbis => "ogg",
        }
    }
}

/// A literal segment and, once rendered, its encoded audio
///
/// `size_bytes`, `length_ms`, `data` and `md5` are filled together by
/// [`AudioClip::apply`]; a clip is ready only when all four are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Literal ordinal of the segment
    pub tag_id: u32,
    /// Literal text recorded in the clip
    pub text: String,
    /// Caller-supplied file base name, overrides the text-derived name
    pub basename: Option<String>,
    pub encoding: ContainerFormat,
    pub size_bytes: Option<u64>,
    pub length_ms: Option<u64>,
    pub data: Option<Vec<u8>>,
    pub md5: Option<String>,
}

impl AudioClip {
    pub fn new(tag_id: u32, text: impl Into<String>, basename: Option<String>) -> Self {
        Self {
            tag_id,
            text: text.into(),
            basename,
            encoding: ContainerFormat::OggVorbis,
            size_bytes: None,
            length_ms: None,
            data: None,
            md5: None,
        }
    }

    /// Take over the metadata and payload of a rendered artifact
    pub fn apply(&mut self, rendered: &RenderedAudio) {
        self.size_bytes = Some(rendered.size_bytes);
        self.length_ms = Some(rendered.length_ms);
        self.data = Some(rendered.data.clone());
        self.md5 = Some(rendered.md5.clone());
    }

    pub fn is_ready(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = |field| ValidationError::MissingField {
            entity: "audio",
            field,
        };
        if self.text.is_empty() {
            return Err(missing("text"));
        }
        if self.size_bytes.is_none() {
            return Err(missing("size"));
        }
        if self.length_ms.is_none() {
            return Err(missing("length"));
        }
        if self.data.is_none() {
            return Err(missing("data"));
        }
        if self.md5.is_none() {
            return Err(missing("md5"));
        }
        Ok(())
    }
}
