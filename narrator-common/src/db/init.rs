//! Database initialization
//!
//! Creates the narration schema read by the runtime player:
//! - `message`: one row per message (original text, class, catalog id)
//! - `messageparameter`: typed placeholders of a message
//! - `messagetranslation`: type-stripped translation text plus audio tags
//! - `messageaudio`: one Ogg Vorbis clip per literal segment

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (or create) the narration database and ensure its schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all narration tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_message_table(pool).await?;
    create_messageparameter_table(pool).await?;
    create_messagetranslation_table(pool).await?;
    create_messageaudio_table(pool).await?;
    Ok(())
}

async fn create_message_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS message (
            string TEXT,
            class TEXT,
            id INT,
            UNIQUE(class, id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_messageparameter_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messageparameter (
            message_id INT,
            key TEXT,
            type TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_messagetranslation_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messagetranslation (
            message_id INT,
            translation TEXT,
            language TEXT,
            audiotags TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_messageaudio_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messageaudio (
            translation_id INT,
            tagid INT,
            text TEXT,
            size INT,
            length INT,
            data BLOB,
            md5 TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}
