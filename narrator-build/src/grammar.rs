//! Placeholder grammar
//!
//! Two surface forms are recognized inside message templates:
//! - typed: `{name:kind}` or `{name:kind(sub)}` (authoring input)
//! - untyped: `{name}` (the form persisted as translation text)
//!
//! Anything that does not match either form (unbalanced braces, spaces or
//! other illegal characters in the kind) is passed through as literal text.
//! Lenient matching is intentional: the scanner never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Matches both placeholder forms; group 1 is the name, group 2 the optional kind
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z0-9_]+)(?::([-A-Za-z0-9_]+(?:\([A-Za-z0-9_]+\))?))?\}")
        .expect("placeholder pattern is valid")
});

/// Date component read out by a `date(...)` placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePart {
    Date,
    Year,
    YearNum,
    Month,
    DayName,
    Minute,
    Second,
}

impl DatePart {
    fn as_str(&self) -> &'static str {
        match self {
            DatePart::Date => "date",
            DatePart::Year => "year",
            DatePart::YearNum => "yearnum",
            DatePart::Month => "month",
            DatePart::DayName => "dayname",
            DatePart::Minute => "minute",
            DatePart::Second => "second",
        }
    }
}

/// Closed set of parameter kinds understood by the runtime player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Number read in the message language
    Number,
    /// Number read with English words
    NumberEn,
    /// Number read digit by digit
    Digits,
    /// One component of a date
    Date(DatePart),
    /// Reference to another message
    Message,
}

impl ParamKind {
    /// Every valid kind, in catalog order
    pub const ALL: [ParamKind; 11] = [
        ParamKind::Number,
        ParamKind::NumberEn,
        ParamKind::Digits,
        ParamKind::Date(DatePart::Date),
        ParamKind::Date(DatePart::Year),
        ParamKind::Date(DatePart::YearNum),
        ParamKind::Date(DatePart::Month),
        ParamKind::Date(DatePart::DayName),
        ParamKind::Date(DatePart::Minute),
        ParamKind::Date(DatePart::Second),
        ParamKind::Message,
    ];
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Number => f.write_str("number"),
            ParamKind::NumberEn => f.write_str("number-en"),
            ParamKind::Digits => f.write_str("digits"),
            ParamKind::Date(part) => write!(f, "date({})", part.as_str()),
            ParamKind::Message => f.write_str("message"),
        }
    }
}

/// Raw kind text that is not part of the closed set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown parameter kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for ParamKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.to_string() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// A placeholder occurrence inside a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Identifier between the braces
    pub name: &'a str,
    /// Raw kind text (`number`, `date(year)`), absent in the untyped form
    pub kind: Option<&'a str>,
    /// Exact source text, braces included
    pub raw: &'a str,
    /// Byte range of `raw` within the scanned text
    pub span: Range<usize>,
}

impl Placeholder<'_> {
    /// Type-stripped rendering, `{name}`
    pub fn untyped(&self) -> String {
        format!("{{{}}}", self.name)
    }
}

/// Result of scanning a template: matched placeholders and passthrough text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    Literal(&'a str),
    Matched(Placeholder<'a>),
}

/// Split text into literal runs and placeholders, in document order
///
/// Empty literal runs (between adjacent placeholders) are not emitted.
pub fn scan(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut cursor = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(name) = caps.get(1) else { continue };

        if whole.start() > cursor {
            pieces.push(Piece::Literal(&text[cursor..whole.start()]));
        }
        pieces.push(Piece::Matched(Placeholder {
            name: name.as_str(),
            kind: caps.get(2).map(|m| m.as_str()),
            raw: whole.as_str(),
            span: whole.range(),
        }));
        cursor = whole.end();
    }

    if cursor < text.len() {
        pieces.push(Piece::Literal(&text[cursor..]));
    }

    pieces
}

/// Remove the `:kind` suffix from every typed placeholder
///
/// Idempotent: untyped placeholders and unmatched text are left untouched.
pub fn strip_type(text: &str) -> String {
    PLACEHOLDER.replace_all(text, "{$1}").into_owned()
}

/// Typed placeholders as `(name, kind)` pairs, in document order
///
/// Duplicates are kept; untyped `{name}` placeholders are not reported.
pub fn extract(text: &str) -> Vec<(String, String)> {
    scan(text)
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Matched(Placeholder {
                name,
                kind: Some(kind),
                ..
            }) => Some((name.to_string(), kind.to_string())),
            _ => None,
        })
        .collect()
}
