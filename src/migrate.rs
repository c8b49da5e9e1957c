use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    create_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create all tables and indexes. Safe to run repeatedly.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // Articles table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS article (
            article_id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug TEXT NOT NULL UNIQUE,
            published TEXT NOT NULL,
            hidden INTEGER NOT NULL DEFAULT 0,
            title TEXT NOT NULL,
            summary_html TEXT,
            full_html TEXT NOT NULL,
            full_plain TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Tag associations; no identity of their own
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS article_tag (
            article_id INTEGER NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY (article_id, tag),
            FOREIGN KEY (article_id) REFERENCES article(article_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_article_tag_tag ON article_tag(tag)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_article_published ON article(published DESC)")
        .execute(pool)
        .await?;

    Ok(())
}
