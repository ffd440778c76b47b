//! Template tokenizer
//!
//! Splits a translation into an ordered list of literal segments and
//! parameter references, and renders the companion tag string the runtime
//! player uses to interleave recorded clips with synthesized values.
//!
//! Literal segments are trimmed of surrounding ASCII spaces and numbered
//! from zero; parameters do not consume literal ordinals. The literal
//! ordinal is the `tagid` of the clip recorded for that segment.

use crate::grammar::{self, Piece};
use std::fmt;

/// One entry of a tokenized template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text with its ordinal among literal segments
    Literal { text: String, ordinal: u32 },
    /// Placeholder with its index among parameter segments
    Param {
        name: String,
        kind: Option<String>,
        index: u32,
    },
}

impl Segment {
    /// Rendering of this segment inside a tag string
    fn tag(&self) -> String {
        match self {
            Segment::Literal { ordinal, .. } => format!("[{}]", ordinal),
            Segment::Param {
                name,
                kind: Some(kind),
                ..
            } => format!("{{{}:{}}}", name, kind),
            Segment::Param { name, kind: None, .. } => format!("{{{}}}", name),
        }
    }
}

/// Ordered segments of one template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenized {
    pub segments: Vec<Segment>,
}

impl Tokenized {
    /// Space-joined tag string, e.g. `[0] {name:number} [1]`
    pub fn tag_string(&self) -> String {
        self.segments
            .iter()
            .map(Segment::tag)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Literal segments as `(ordinal, text)`, in order
    pub fn literals(&self) -> impl Iterator<Item = (u32, &str)> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Literal { text, ordinal } => Some((*ordinal, text.as_str())),
            Segment::Param { .. } => None,
        })
    }

    /// Number of literal segments
    pub fn literal_count(&self) -> usize {
        self.literals().count()
    }
}

impl fmt::Display for Tokenized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag_string())
    }
}

/// Tokenize a template (typed or untyped form)
///
/// Placeholder boundaries are the same in both forms, so the typed text is
/// scanned directly and the kind is kept for the tag string.
pub fn tokenize(text: &str) -> Tokenized {
    let mut segments = Vec::new();
    let mut next_ordinal = 0u32;
    let mut next_index = 0u32;

    for piece in grammar::scan(text) {
        match piece {
            Piece::Literal(raw) => {
                let trimmed = raw.trim_matches(' ');
                if !trimmed.is_empty() {
                    segments.push(Segment::Literal {
                        text: trimmed.to_string(),
                        ordinal: next_ordinal,
                    });
                    next_ordinal += 1;
                }
            }
            Piece::Matched(placeholder) => {
                segments.push(Segment::Param {
                    name: placeholder.name.to_string(),
                    kind: placeholder.kind.map(str::to_string),
                    index: next_index,
                });
                next_index += 1;
            }
        }
    }

    Tokenized { segments }
}

/// Entry of a parsed tag string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// `[n]`: recorded clip with tagid `n`
    Audio(u32),
    /// `{name}` or `{name:kind}`: parameter key
    Param(String),
    /// Anything else; the runtime player skips it
    Unknown(String),
}

/// Parse a tag string back into its entries
pub fn parse_tag_string(tags: &str) -> Vec<Tag> {
    tags.split(' ')
        .filter(|t| !t.is_empty())
        .map(|t| {
            if let Some(inner) = t.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
                if let Ok(id) = inner.parse::<u32>() {
                    return Tag::Audio(id);
                }
            }
            if let Some(inner) = t.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
                let name = inner.split(':').next().unwrap_or(inner);
                return Tag::Param(name.to_string());
            }
            Tag::Unknown(t.to_string())
        })
        .collect()
}
