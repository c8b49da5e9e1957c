//! SQLite-backed [`ArticleStore`] implementation.
//!
//! Maps each store and transaction operation onto the `article` and
//! `article_tag` tables created by [`crate::migrate`].

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use article_sync_core::error::StorageError;
use article_sync_core::models::{ArticleRow, StoredArticle, TagSet, PUBLISHED_FORMAT};
use article_sync_core::store::{ArticleStore, ArticleTx};

/// SQLite implementation of the [`ArticleStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

struct SqliteTx {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl ArticleTx for SqliteTx {
    async fn find_article_id(&mut self, slug: &str) -> Result<Option<i64>, StorageError> {
        sqlx::query_scalar::<_, i64>("SELECT article_id FROM article WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(StorageError::db)
    }

    async fn insert_article(&mut self, row: &ArticleRow<'_>) -> Result<i64, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO article (slug, published, hidden, title, summary_html, full_html, full_plain)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.slug)
        .bind(row.published_text())
        .bind(row.hidden)
        .bind(row.title)
        .bind(row.summary_html)
        .bind(row.full_html)
        .bind(&row.full_plain)
        .execute(&mut *self.tx)
        .await
        .map_err(StorageError::db)?;

        Ok(result.last_insert_rowid())
    }

    async fn update_article(
        &mut self,
        id: i64,
        row: &ArticleRow<'_>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            UPDATE article SET
                published = ?,
                hidden = ?,
                title = ?,
                summary_html = ?,
                full_html = ?,
                full_plain = ?
            WHERE article_id = ?
            "#,
        )
        .bind(row.published_text())
        .bind(row.hidden)
        .bind(row.title)
        .bind(row.summary_html)
        .bind(row.full_html)
        .bind(&row.full_plain)
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .map_err(StorageError::db)?;

        Ok(())
    }

    async fn delete_tags(&mut self, article_id: i64) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM article_tag WHERE article_id = ?")
            .bind(article_id)
            .execute(&mut *self.tx)
            .await
            .map_err(StorageError::db)?;
        Ok(())
    }

    async fn insert_tags(&mut self, article_id: i64, tags: &TagSet) -> Result<(), StorageError> {
        for tag in tags {
            sqlx::query("INSERT OR REPLACE INTO article_tag (article_id, tag) VALUES (?, ?)")
                .bind(article_id)
                .bind(tag)
                .execute(&mut *self.tx)
                .await
                .map_err(StorageError::db)?;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let this = *self;
        this.tx.commit().await.map_err(StorageError::db)
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        let this = *self;
        this.tx.rollback().await.map_err(StorageError::db)
    }
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn begin(&self) -> Result<Box<dyn ArticleTx + '_>, StorageError> {
        let tx = self.pool.begin().await.map_err(StorageError::db)?;
        Ok(Box::new(SqliteTx { tx }))
    }

    async fn delete_articles_except(&self, slugs: &[&str]) -> Result<u64, StorageError> {
        // SQLite accepts `NOT IN ()`, which would match every row.
        if slugs.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; slugs.len()].join(",");
        let sql = format!("DELETE FROM article WHERE slug NOT IN ({placeholders})");

        let mut query = sqlx::query(&sql);
        for slug in slugs {
            query = query.bind(*slug);
        }

        let result = query.execute(&self.pool).await.map_err(StorageError::db)?;
        Ok(result.rows_affected())
    }

    async fn get_article(&self, slug: &str) -> Result<Option<StoredArticle>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT article_id, slug, published, hidden, title, summary_html, full_html, full_plain
            FROM article WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::db)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: i64 = row.get("article_id");
        let published: String = row.get("published");
        let published = NaiveDateTime::parse_from_str(&published, PUBLISHED_FORMAT)
            .map_err(|e| StorageError::Backend(format!("bad published value {published:?}: {e}")))?;

        let tags: Vec<String> =
            sqlx::query_scalar("SELECT tag FROM article_tag WHERE article_id = ? ORDER BY tag ASC")
                .bind(id)
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::db)?;

        Ok(Some(StoredArticle {
            id,
            slug: row.get("slug"),
            published,
            hidden: row.get("hidden"),
            title: row.get("title"),
            summary_html: row.get("summary_html"),
            full_html: row.get("full_html"),
            full_plain: row.get("full_plain"),
            tags,
        }))
    }

    async fn list_slugs(&self) -> Result<Vec<String>, StorageError> {
        sqlx::query_scalar::<_, String>("SELECT slug FROM article ORDER BY slug ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::db)
    }
}
