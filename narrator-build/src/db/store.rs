//! Natural-key persistence
//!
//! Every row is looked up by its natural key before insertion; a hit adopts
//! the existing rowid instead of inserting. Rebuilding from unchanged input
//! therefore adds nothing, and append builds can be re-run safely.

use crate::models::{
    AudioClip, AudioKey, Message, MessageKey, Parameter, ParameterKey, Translation, TranslationKey,
};
use narrator_common::{Error, Result};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, info};

/// Rowid of a persisted entity and how it was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persisted {
    Inserted(i64),
    Adopted(i64),
}

impl Persisted {
    pub fn id(&self) -> i64 {
        match self {
            Persisted::Inserted(id) | Persisted::Adopted(id) => *id,
        }
    }
}

/// Row counts of one persist run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub inserted: usize,
    pub adopted: usize,
}

impl PersistSummary {
    fn record(&mut self, persisted: Persisted) -> i64 {
        match persisted {
            Persisted::Inserted(_) => self.inserted += 1,
            Persisted::Adopted(_) => self.adopted += 1,
        }
        persisted.id()
    }
}

/// Persist every message in one transaction
///
/// Nothing is written unless every row succeeds.
pub async fn persist_all(pool: &SqlitePool, messages: &[Message]) -> Result<PersistSummary> {
    let mut tx = pool.begin().await?;
    let mut summary = PersistSummary::default();

    for message in messages {
        persist_message(&mut *tx, message, &mut summary).await?;
    }

    tx.commit().await?;
    info!(
        messages = messages.len(),
        inserted = summary.inserted,
        adopted = summary.adopted,
        "Database written"
    );
    Ok(summary)
}

/// Persist a message with its translation, parameters and clips
pub async fn persist_message(
    conn: &mut SqliteConnection,
    message: &Message,
    summary: &mut PersistSummary,
) -> Result<Persisted> {
    let persisted = insert_message(conn, message).await?;
    let message_id = summary.record(persisted);

    let translation = insert_translation(conn, message_id, &message.translation).await?;
    let translation_id = summary.record(translation);

    for parameter in &message.translation.parameters {
        summary.record(insert_parameter(conn, message_id, parameter).await?);
    }

    for clip in &message.translation.clips {
        summary.record(insert_audio(conn, translation_id, clip).await?);
    }

    Ok(persisted)
}

/// Rowid of the message with this natural key, if stored
pub async fn find_message(conn: &mut SqliteConnection, key: &MessageKey) -> Result<Option<i64>> {
    let row = sqlx::query("SELECT rowid FROM message WHERE string = ? AND class = ?")
        .bind(&key.key)
        .bind(&key.class)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(|r| r.get::<i64, _>(0)))
}

pub async fn insert_message(conn: &mut SqliteConnection, message: &Message) -> Result<Persisted> {
    let key = message.natural_key();
    if let Some(id) = find_message(conn, &key).await? {
        debug!(key = %key.key, id, "Message already stored");
        return Ok(Persisted::Adopted(id));
    }

    let result = sqlx::query("INSERT INTO message (string, class, id) VALUES (?, ?, ?)")
        .bind(&key.key)
        .bind(&key.class)
        .bind(message.id)
        .execute(&mut *conn)
        .await?;
    Ok(Persisted::Inserted(result.last_insert_rowid()))
}

pub async fn find_translation(conn: &mut SqliteConnection, key: &TranslationKey) -> Result<Option<i64>> {
    let row = sqlx::query(
        r#"
        SELECT rowid FROM messagetranslation
        WHERE message_id = ? AND translation = ? AND language = ?
        "#,
    )
    .bind(key.message_id)
    .bind(&key.text)
    .bind(&key.language)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(|r| r.get::<i64, _>(0)))
}

pub async fn insert_translation(
    conn: &mut SqliteConnection,
    message_id: i64,
    translation: &Translation,
) -> Result<Persisted> {
    let key = translation.natural_key(message_id);
    if let Some(id) = find_translation(conn, &key).await? {
        return Ok(Persisted::Adopted(id));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO messagetranslation (message_id, translation, language, audiotags)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(key.message_id)
    .bind(&key.text)
    .bind(&key.language)
    .bind(translation.tag_string())
    .execute(&mut *conn)
    .await?;
    Ok(Persisted::Inserted(result.last_insert_rowid()))
}

pub async fn find_parameter(conn: &mut SqliteConnection, key: &ParameterKey) -> Result<Option<i64>> {
    let row = sqlx::query(
        "SELECT rowid FROM messageparameter WHERE message_id = ? AND key = ? AND type = ?",
    )
    .bind(key.message_id)
    .bind(&key.name)
    .bind(&key.kind)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(|r| r.get::<i64, _>(0)))
}

pub async fn insert_parameter(
    conn: &mut SqliteConnection,
    message_id: i64,
    parameter: &Parameter,
) -> Result<Persisted> {
    let key = parameter.natural_key(message_id);
    if let Some(id) = find_parameter(conn, &key).await? {
        return Ok(Persisted::Adopted(id));
    }

    let result = sqlx::query("INSERT INTO messageparameter (message_id, key, type) VALUES (?, ?, ?)")
        .bind(key.message_id)
        .bind(&key.name)
        .bind(&key.kind)
        .execute(&mut *conn)
        .await?;
    Ok(Persisted::Inserted(result.last_insert_rowid()))
}

pub async fn find_audio(conn: &mut SqliteConnection, key: &AudioKey) -> Result<Option<i64>> {
    let row = sqlx::query(
        "SELECT rowid FROM messageaudio WHERE translation_id = ? AND tagid = ? AND text = ?",
    )
    .bind(key.translation_id)
    .bind(i64::from(key.tag_id))
    .bind(&key.text)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(|r| r.get::<i64, _>(0)))
}

/// Insert a rendered clip; an unrendered clip is rejected
pub async fn insert_audio(
    conn: &mut SqliteConnection,
    translation_id: i64,
    clip: &AudioClip,
) -> Result<Persisted> {
    let key = clip.natural_key(translation_id);
    if let Some(id) = find_audio(conn, &key).await? {
        return Ok(Persisted::Adopted(id));
    }

    let (Some(size), Some(length), Some(data), Some(md5)) =
        (clip.size_bytes, clip.length_ms, clip.data.as_deref(), clip.md5.as_deref())
    else {
        return Err(Error::InvalidInput(format!(
            "audio clip '{}' has not been rendered",
            clip.text
        )));
    };

    let result = sqlx::query(
        r#"
        INSERT INTO messageaudio (translation_id, tagid, text, size, length, data, md5)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(key.translation_id)
    .bind(i64::from(key.tag_id))
    .bind(&key.text)
    .bind(to_sql_int(size)?)
    .bind(to_sql_int(length)?)
    .bind(data)
    .bind(md5)
    .execute(&mut *conn)
    .await?;
    Ok(Persisted::Inserted(result.last_insert_rowid()))
}

fn to_sql_int(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| Error::InvalidInput(format!("{} does not fit an INT column", value)))
}
