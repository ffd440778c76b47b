//! Playback length extraction from ogginfo reports

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static PLAYBACK_LENGTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Playback length: (\d+)m:(\d+)\.(\d+)s").expect("playback length pattern is valid")
});

/// Report did not contain exactly one parseable playback length
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("expected one playback length line, found {0}")]
    MatchCount(usize),

    #[error("playback length component out of range: {0}")]
    OutOfRange(String),
}

/// Playback length in milliseconds
///
/// Computed as `minutes * 60000 + seconds * 1000 + fraction`, where the
/// fraction digits are taken as a literal millisecond count: `02.030s` is
/// 2030 ms but `01.5s` is 1005 ms, not 1500 ms. ogginfo prints three
/// fraction digits, for which both readings agree.
pub fn parse_playback_length(report: &str) -> Result<u64, DurationParseError> {
    let matches: Vec<_> = PLAYBACK_LENGTH.captures_iter(report).collect();
    if matches.len() != 1 {
        return Err(DurationParseError::MatchCount(matches.len()));
    }
    let caps = &matches[0];

    let component = |i: usize| -> Result<u64, DurationParseError> {
        let raw = caps.get(i).map(|m| m.as_str()).unwrap_or_default();
        raw.parse::<u64>()
            .map_err(|_| DurationParseError::OutOfRange(raw.to_string()))
    };

    let minutes = component(1)?;
    let seconds = component(2)?;
    let fraction = component(3)?;

    minutes
        .checked_mul(60_000)
        .and_then(|ms| seconds.checked_mul(1000).and_then(|s| ms.checked_add(s)))
        .and_then(|ms| ms.checked_add(fraction))
        .ok_or_else(|| DurationParseError::OutOfRange(caps[0].to_string()))
}
