//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all ledger data.

mod repository;
mod seed;

pub use repository::*;
pub use seed::seed_demo_data;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL DEFAULT 1,
            revision_id INTEGER NOT NULL DEFAULT 0,
            generated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        INSERT OR IGNORE INTO meta (id, schema_version, revision_id, generated_at)
        VALUES (1, 1, 0, datetime('now'));
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            sector TEXT NOT NULL,
            points INTEGER NOT NULL DEFAULT 0,
            pin TEXT NOT NULL,
            is_admin INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS news (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            summary TEXT NOT NULL,
            content TEXT NOT NULL,
            image_url TEXT NOT NULL,
            published_at TEXT NOT NULL,
            sector TEXT NOT NULL,
            importance TEXT NOT NULL,
            views INTEGER NOT NULL DEFAULT 0,
            likes INTEGER NOT NULL DEFAULT 0,
            dislikes INTEGER NOT NULL DEFAULT 0,
            avg_time INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    // One row per (article, employee): the read-award can only be collected once.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS article_reads (
            article_id TEXT NOT NULL REFERENCES news(id),
            employee_id TEXT NOT NULL REFERENCES employees(id),
            read_at TEXT NOT NULL,
            PRIMARY KEY (article_id, employee_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS suggestions (
            id TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            submitted_at TEXT NOT NULL,
            is_anonymous INTEGER NOT NULL,
            author_name TEXT,
            status TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS redemptions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            reward_name TEXT NOT NULL,
            cost INTEGER NOT NULL,
            redeemed_at TEXT NOT NULL,
            qr_token TEXT NOT NULL,
            gifted_to TEXT,
            gifted_to_id TEXT,
            is_gift INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_employees_sector ON employees(sector);
        CREATE INDEX IF NOT EXISTS idx_news_published_at ON news(published_at);
        CREATE INDEX IF NOT EXISTS idx_suggestions_submitted_at ON suggestions(submitted_at);
        CREATE INDEX IF NOT EXISTS idx_redemptions_user_id ON redemptions(user_id);
        CREATE INDEX IF NOT EXISTS idx_redemptions_gifted_to_id ON redemptions(gifted_to_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
