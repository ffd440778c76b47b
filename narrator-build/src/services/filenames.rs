//! Clip file naming
//!
//! A clip's waveform and compressed files share one base name: the
//! caller-supplied base name when given, else a slug of the clip text.

/// File name for a clip, `<base>.<extension>`
pub fn clip_file_name(text: &str, basename: Option<&str>, extension: &str) -> String {
    match basename {
        Some(base) => format!("{}.{}", base, extension),
        None => format!("{}.{}", slugify(text), extension),
    }
}

/// Lower-case slug of a clip text
///
/// Folds å/ä/ö (either case) to a/o, drops `?.,:` and turns spaces into
/// underscores. Only ASCII letters are lower-cased; other characters are
/// kept as they are, so `Über` stays `Über`.
pub fn slugify(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            'å' | 'ä' => Some('a'),
            'Å' | 'Ä' => Some('A'),
            'ö' => Some('o'),
            'Ö' => Some('O'),
            '?' | '.' | ',' | ':' => None,
            ' ' => Some('_'),
            other => Some(other),
        })
        .collect::<String>()
        .to_ascii_lowercase()
}
