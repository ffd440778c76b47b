//! Message catalogs
//!
//! Three `;`-separated files describe a build:
//! - prompts: `key` (one row per message included in the build)
//! - messages: `id;class;key`
//! - translations: `key;text;basename...`
//!
//! Blank rows and rows whose first field starts with `#` are skipped. The
//! default narrator catalogs are merged under the user's catalogs before the
//! build plan is assembled.

use crate::models::{Message, Translation};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

/// Catalog loading and assembly errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not parse {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} duplicate identifier(s) in catalogs", .0.len())]
    Duplicates(Vec<Duplicate>),

    #[error("no '{language}' translation found for message '{key}' (add it to the translation file)")]
    MissingTranslation { key: String, language: String },

    #[error("no message with identifier '{key}' found (add it to the message file)")]
    MissingMessage { key: String },

    #[error("invalid id '{id}' for message '{key}'")]
    InvalidId { key: String, id: String },
}

/// An identifier occurring more than once in one catalog file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub identifier: String,
    pub count: usize,
    pub file: PathBuf,
}

impl fmt::Display for Duplicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "identifier '{}' occurs {} times in file {}",
            self.identifier,
            self.count,
            self.file.display()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRow {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    /// Catalog id as written; parsed during assembly
    pub id: String,
    pub class: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRow {
    pub key: String,
    pub text: String,
    pub basenames: Vec<String>,
}

/// Catalog file locations; an absent entry reads as an empty list
#[derive(Debug, Clone, Default)]
pub struct CatalogSources {
    pub prompts: Option<PathBuf>,
    pub messages: Option<PathBuf>,
    pub translations: Option<PathBuf>,
}

impl CatalogSources {
    /// User-supplied catalogs; every file must be readable
    pub fn user(prompts: PathBuf, messages: PathBuf, translations: PathBuf) -> Self {
        Self {
            prompts: Some(prompts),
            messages: Some(messages),
            translations: Some(translations),
        }
    }

    /// Default narrator catalogs in `data_dir`, skipping files that do not exist
    pub fn defaults(data_dir: &Path, language: &str) -> Self {
        let existing = |name: String| {
            let path = data_dir.join(name);
            if path.exists() {
                Some(path)
            } else {
                debug!(path = %path.display(), "Default catalog not present");
                None
            }
        };
        Self {
            prompts: existing("narrator.csv".to_string()),
            messages: existing("types.csv".to_string()),
            translations: existing(format!("{}_translations.csv", language)),
        }
    }
}

/// Parsed catalog rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub prompts: Vec<PromptRow>,
    pub messages: Vec<MessageRow>,
    pub translations: Vec<TranslationRow>,
}

impl Catalog {
    /// Read every listed file and report duplicate identifiers per file
    ///
    /// Duplicates are returned rather than raised so that callers can
    /// report every duplicate across several catalogs before failing.
    pub fn read(sources: &CatalogSources) -> Result<(Catalog, Vec<Duplicate>), CatalogError> {
        let mut catalog = Catalog::default();
        let mut duplicates = Vec::new();

        if let Some(path) = &sources.prompts {
            let rows = read_rows(path)?;
            duplicates.extend(find_duplicates(rows.iter().map(|r| r[0].as_str()), path));
            catalog.prompts = rows
                .into_iter()
                .map(|r| PromptRow { key: r[0].clone() })
                .collect();
        }

        if let Some(path) = &sources.messages {
            let rows = read_rows(path)?;
            duplicates.extend(find_duplicates(
                rows.iter().filter(|r| r.len() >= 3).map(|r| r[2].as_str()),
                path,
            ));
            duplicates.extend(find_duplicates(rows.iter().map(|r| r[0].as_str()), path));
            catalog.messages = rows
                .into_iter()
                .filter(|r| r.len() >= 3)
                .map(|r| MessageRow {
                    id: r[0].clone(),
                    class: r[1].clone(),
                    key: r[2].clone(),
                })
                .collect();
        }

        if let Some(path) = &sources.translations {
            let rows = read_rows(path)?;
            duplicates.extend(find_duplicates(rows.iter().map(|r| r[0].as_str()), path));
            catalog.translations = rows
                .into_iter()
                .filter(|r| r.len() >= 2)
                .map(|mut r| {
                    let basenames = r.split_off(2);
                    TranslationRow {
                        text: r.pop().unwrap_or_default(),
                        key: r.pop().unwrap_or_default(),
                        basenames,
                    }
                })
                .collect();
        }

        Ok((catalog, duplicates))
    }

    /// Merge `user` rows over these (default) rows
    ///
    /// Prompts: user prompts not already listed are appended. Messages: a
    /// user row replaces the default row with the same class and key.
    /// Translations: a user row replaces the default row with the same key.
    pub fn merge(mut self, user: Catalog) -> Catalog {
        for prompt in user.prompts {
            if !self.prompts.iter().any(|p| p.key == prompt.key) {
                self.prompts.push(prompt);
            }
        }

        for message in user.messages {
            match self
                .messages
                .iter()
                .position(|m| m.class == message.class && m.key == message.key)
            {
                Some(index) => self.messages[index] = message,
                None => self.messages.push(message),
            }
        }

        for translation in user.translations {
            match self.translations.iter().position(|t| t.key == translation.key) {
                Some(index) => self.translations[index] = translation,
                None => self.translations.push(translation),
            }
        }

        self
    }

    /// Build the messages listed in the prompts, in prompt order
    pub fn assemble(&self, language: &str) -> Result<Vec<Message>, CatalogError> {
        let translations: HashMap<&str, &TranslationRow> = self
            .translations
            .iter()
            .map(|t| (t.key.as_str(), t))
            .collect();

        let mut messages: HashMap<&str, Vec<Message>> = HashMap::new();
        for row in &self.messages {
            let translation = translations.get(row.key.as_str()).ok_or_else(|| {
                CatalogError::MissingTranslation {
                    key: row.key.clone(),
                    language: language.to_string(),
                }
            })?;
            let id = row.id.trim().parse::<i64>().map_err(|_| CatalogError::InvalidId {
                key: row.key.clone(),
                id: row.id.clone(),
            })?;
            let translation = Translation::new(
                language,
                &translation.key,
                &translation.text,
                translation.basenames.iter().cloned(),
            );
            messages
                .entry(row.key.as_str())
                .or_default()
                .push(Message::new(&row.key, &row.class, id, translation));
        }

        self.prompts
            .iter()
            .map(|prompt| {
                // a key defined under two classes is as unusable as a missing one
                match messages.get(prompt.key.as_str()).map(Vec::as_slice) {
                    Some([message]) => Ok(message.clone()),
                    _ => Err(CatalogError::MissingMessage {
                        key: prompt.key.clone(),
                    }),
                }
            })
            .collect()
    }
}

/// Read the default narrator catalogs and the user catalogs, then merge
///
/// Every duplicate in every file is logged before the run fails.
pub fn load(defaults: &CatalogSources, user: &CatalogSources) -> Result<Catalog, CatalogError> {
    let (base, mut duplicates) = Catalog::read(defaults)?;
    let (overrides, user_duplicates) = Catalog::read(user)?;
    duplicates.extend(user_duplicates);

    if !duplicates.is_empty() {
        for duplicate in &duplicates {
            error!("{}", duplicate);
        }
        return Err(CatalogError::Duplicates(duplicates));
    }

    Ok(base.merge(overrides))
}

/// Raw rows of one catalog file, comments and blank rows removed
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, CatalogError> {
    let read_error = |source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .quote(b'"')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(read_error)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_error)?;
        let row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.iter().all(String::is_empty) || row[0].starts_with('#') {
            continue;
        }
        rows.push(row);
    }

    debug!(path = %path.display(), rows = rows.len(), "Read catalog");
    Ok(rows)
}

fn find_duplicates<'a>(identifiers: impl Iterator<Item = &'a str>, file: &Path) -> Vec<Duplicate> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    for identifier in identifiers {
        let count = counts.entry(identifier).or_insert(0);
        if *count == 0 {
            order.push(identifier);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter(|identifier| counts[identifier] > 1)
        .map(|identifier| Duplicate {
            identifier: identifier.to_string(),
            count: counts[identifier],
            file: file.to_path_buf(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn message(id: &str, class: &str, key: &str) -> MessageRow {
        MessageRow {
            id: id.to_string(),
            class: class.to_string(),
            key: key.to_string(),
        }
    }

    fn translation(key: &str, text: &str) -> TranslationRow {
        TranslationRow {
            key: key.to_string(),
            text: text.to_string(),
            basenames: Vec::new(),
        }
    }

    #[test]
    fn test_read_rows_skips_comments_and_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "t.csv",
            "# comment;ignored\n\n\"Hello; there\";Hej där;hej\nBye;Hej då\n",
        );
        let rows = read_rows(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["Hello; there".to_string(), "Hej där".to_string(), "hej".to_string()],
                vec!["Bye".to_string(), "Hej då".to_string()],
            ]
        );
    }

    #[test]
    fn test_read_collects_basenames_and_duplicates() {
        let dir = TempDir::new().unwrap();
        let messages = write(&dir, "m.csv", "1;prompt;Hello\n1;prompt;Bye\n2;prompt;Hello\n");
        let translations = write(&dir, "t.csv", "Hello;Hej;hej_a;hej_b\nBye;Hej då\n");
        let prompts = write(&dir, "p.csv", "Hello\nBye\n");

        let (catalog, duplicates) =
            Catalog::read(&CatalogSources::user(prompts, messages.clone(), translations)).unwrap();

        assert_eq!(catalog.translations[0].basenames, vec!["hej_a", "hej_b"]);
        assert_eq!(catalog.translations[1].basenames, Vec::<String>::new());
        assert_eq!(
            duplicates,
            vec![
                Duplicate {
                    identifier: "Hello".to_string(),
                    count: 2,
                    file: messages.clone(),
                },
                Duplicate {
                    identifier: "1".to_string(),
                    count: 2,
                    file: messages,
                },
            ]
        );
    }

    #[test]
    fn test_missing_user_file_is_read_error() {
        let sources = CatalogSources::user(
            PathBuf::from("/nonexistent/p.csv"),
            PathBuf::from("/nonexistent/m.csv"),
            PathBuf::from("/nonexistent/t.csv"),
        );
        assert!(matches!(Catalog::read(&sources), Err(CatalogError::Read { .. })));
    }

    #[test]
    fn test_merge_overrides_and_appends() {
        let defaults = Catalog {
            prompts: vec![PromptRow { key: "A".into() }, PromptRow { key: "B".into() }],
            messages: vec![message("1", "prompt", "A"), message("2", "prompt", "B")],
            translations: vec![translation("A", "a-default"), translation("B", "b-default")],
        };
        let user = Catalog {
            prompts: vec![PromptRow { key: "B".into() }, PromptRow { key: "C".into() }],
            messages: vec![message("20", "prompt", "B"), message("3", "announcement", "A")],
            translations: vec![translation("B", "b-user"), translation("C", "c-user")],
        };

        let merged = defaults.merge(user);
        let prompts: Vec<&str> = merged.prompts.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(prompts, vec!["A", "B", "C"]);
        assert_eq!(merged.messages[1], message("20", "prompt", "B"));
        assert_eq!(merged.messages[2], message("3", "announcement", "A"));
        assert_eq!(merged.translations[1].text, "b-user");
        assert_eq!(merged.translations[2].text, "c-user");
    }

    #[test]
    fn test_assemble_follows_prompt_order() {
        let catalog = Catalog {
            prompts: vec![PromptRow { key: "B".into() }, PromptRow { key: "A".into() }],
            messages: vec![message("1", "prompt", "A"), message("2", "prompt", "B")],
            translations: vec![translation("A", "Alpha"), translation("B", "Beta {n:number}")],
        };
        let messages = catalog.assemble("sv").unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].key, "B");
        assert_eq!(messages[0].id, 2);
        assert_eq!(messages[0].translation.tag_string(), "[0] {n:number}");
        assert_eq!(messages[1].translation.language, "sv");
    }

    #[test]
    fn test_assemble_missing_translation() {
        let catalog = Catalog {
            prompts: vec![],
            messages: vec![message("1", "prompt", "A")],
            translations: vec![],
        };
        let err = catalog.assemble("sv").unwrap_err();
        assert!(matches!(err, CatalogError::MissingTranslation { ref key, .. } if key == "A"));
    }

    #[test]
    fn test_assemble_missing_message() {
        let catalog = Catalog {
            prompts: vec![PromptRow { key: "Z".into() }],
            messages: vec![],
            translations: vec![],
        };
        assert!(matches!(
            catalog.assemble("sv"),
            Err(CatalogError::MissingMessage { .. })
        ));
    }

    #[test]
    fn test_assemble_invalid_id() {
        let catalog = Catalog {
            prompts: vec![],
            messages: vec![message("one", "prompt", "A")],
            translations: vec![translation("A", "Alpha")],
        };
        assert!(matches!(catalog.assemble("sv"), Err(CatalogError::InvalidId { .. })));
    }
}
