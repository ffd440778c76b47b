//! Natural-key persistence tests against temporary SQLite files

use narrator_build::db::{insert_message, persist_all, persist_message, PersistSummary, Persisted};
use narrator_build::models::{Message, Translation};
use narrator_build::services::{EncodeOutcome, RenderedAudio};
use narrator_common::db::init_database;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tempfile::TempDir;

fn rendered(data: &[u8]) -> RenderedAudio {
    RenderedAudio {
        ogg_path: PathBuf::from("clip.ogg"),
        size_bytes: data.len() as u64,
        length_ms: 640,
        data: data.to_vec(),
        md5: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
        outcome: EncodeOutcome::Encoded,
    }
}

fn rendered_message(key: &str, text: &str, id: i64) -> Message {
    let mut translation = Translation::new("sv", key, text, Vec::new());
    for clip in &mut translation.clips {
        clip.apply(&rendered(clip.text.as_bytes()));
    }
    Message::new(key, "prompt", id, translation)
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn setup() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("narrator.db")).await.unwrap();
    (dir, pool)
}

#[tokio::test]
async fn test_double_insert_adopts_existing_row() {
    let (_dir, pool) = setup().await;
    let message = rendered_message("Hello", "Hej", 1);
    let mut conn = pool.acquire().await.unwrap();

    let first = insert_message(&mut conn, &message).await.unwrap();
    let second = insert_message(&mut conn, &message).await.unwrap();

    assert!(matches!(first, Persisted::Inserted(_)));
    assert_eq!(second, Persisted::Adopted(first.id()));
    drop(conn);
    assert_eq!(count(&pool, "message").await, 1);
}

#[tokio::test]
async fn test_rebuild_is_a_no_op() {
    let (_dir, pool) = setup().await;
    let messages = vec![
        rendered_message("Page {n:number} of {t:number}", "Sida {n:number} av {t:number}", 1),
        rendered_message("Hello", "Hej", 2),
    ];

    let first = persist_all(&pool, &messages).await.unwrap();
    let second = persist_all(&pool, &messages).await.unwrap();

    // 2 messages + 2 translations + 2 parameters + 3 clips
    assert_eq!(first, PersistSummary { inserted: 9, adopted: 0 });
    assert_eq!(second, PersistSummary { inserted: 0, adopted: 9 });
    assert_eq!(count(&pool, "message").await, 2);
    assert_eq!(count(&pool, "messagetranslation").await, 2);
    assert_eq!(count(&pool, "messageparameter").await, 2);
    assert_eq!(count(&pool, "messageaudio").await, 3);
}

#[tokio::test]
async fn test_translation_row_contents() {
    let (_dir, pool) = setup().await;
    let messages = vec![rendered_message("Page {n:number}", "Sida {n:number} nu", 4)];

    persist_all(&pool, &messages).await.unwrap();

    let (translation, language, tags): (String, String, String) = sqlx::query_as(
        "SELECT translation, language, audiotags FROM messagetranslation",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(translation, "Sida {n} nu");
    assert_eq!(language, "sv");
    assert_eq!(tags, "[0] {n:number} [1]");

    let (message_id, key, kind): (i64, String, String) =
        sqlx::query_as("SELECT message_id, key, type FROM messageparameter")
            .fetch_one(&pool)
            .await
            .unwrap();
    let message_rowid: i64 = sqlx::query_scalar("SELECT rowid FROM message")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(message_id, message_rowid);
    assert_eq!((key.as_str(), kind.as_str()), ("n", "number"));

    let rows: Vec<(i64, String, i64, Vec<u8>)> =
        sqlx::query_as("SELECT tagid, text, length, data FROM messageaudio ORDER BY tagid")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], (0, "Sida".to_string(), 640, b"Sida".to_vec()));
    assert_eq!(rows[1].1, "nu");
}

#[tokio::test]
async fn test_append_adds_only_new_messages() {
    let (_dir, pool) = setup().await;
    persist_all(&pool, &[rendered_message("Hello", "Hej", 1)])
        .await
        .unwrap();

    let summary = persist_all(
        &pool,
        &[rendered_message("Hello", "Hej", 1), rendered_message("Bye", "Hej då", 2)],
    )
    .await
    .unwrap();

    assert_eq!(summary, PersistSummary { inserted: 3, adopted: 3 });
    assert_eq!(count(&pool, "message").await, 2);
}

#[tokio::test]
async fn test_unrendered_clip_rolls_back_transaction() {
    let (_dir, pool) = setup().await;
    let unrendered = Message::new("Bye", "prompt", 2, Translation::new("sv", "Bye", "Hej då", Vec::new()));

    let result = persist_all(&pool, &[rendered_message("Hello", "Hej", 1), unrendered]).await;

    assert!(matches!(result, Err(narrator_common::Error::InvalidInput(_))));
    assert_eq!(count(&pool, "message").await, 0);
    assert_eq!(count(&pool, "messageaudio").await, 0);
}

#[tokio::test]
async fn test_persist_message_reuses_parent_ids() {
    let (_dir, pool) = setup().await;
    let message = rendered_message("Page {n:number}", "Sida {n:number}", 3);
    let mut conn = pool.acquire().await.unwrap();
    let mut summary = PersistSummary::default();

    let first = persist_message(&mut conn, &message, &mut summary).await.unwrap();
    let second = persist_message(&mut conn, &message, &mut summary).await.unwrap();

    assert_eq!(first.id(), second.id());
    assert_eq!(summary, PersistSummary { inserted: 4, adopted: 4 });
}
