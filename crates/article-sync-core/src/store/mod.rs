//! Storage abstraction for article-sync.
//!
//! The [`ArticleStore`] trait defines everything the sync engine needs
//! from persistent storage, enabling pluggable backends (SQLite in the
//! application crate, [`memory::InMemoryStore`] for tests).
//!
//! Writes happen inside an [`ArticleTx`]: one transaction per article,
//! opened with [`ArticleStore::begin`] and finished with
//! [`ArticleTx::commit`] or [`ArticleTx::rollback`]. Dropping a transaction
//! without committing discards its writes.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::{ArticleRow, StoredArticle, TagSet};

/// Writes scoped to one open transaction.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`find_article_id`](ArticleTx::find_article_id) | Look up storage identity by slug |
/// | [`insert_article`](ArticleTx::insert_article) | Insert a new article, returning its id |
/// | [`update_article`](ArticleTx::update_article) | Overwrite mutable columns of an existing article |
/// | [`delete_tags`](ArticleTx::delete_tags) | Remove every tag association of an article |
/// | [`insert_tags`](ArticleTx::insert_tags) | Associate a tag set with an article |
#[async_trait]
pub trait ArticleTx: Send {
    async fn find_article_id(&mut self, slug: &str) -> Result<Option<i64>, StorageError>;

    /// Insert a new article. Storage assigns and returns the id.
    async fn insert_article(&mut self, row: &ArticleRow<'_>) -> Result<i64, StorageError>;

    /// Update every column except `slug` for the article with this id.
    async fn update_article(&mut self, id: i64, row: &ArticleRow<'_>)
        -> Result<(), StorageError>;

    async fn delete_tags(&mut self, article_id: i64) -> Result<(), StorageError>;

    async fn insert_tags(&mut self, article_id: i64, tags: &TagSet) -> Result<(), StorageError>;

    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;
}

/// Abstract storage backend for synchronized articles.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Open a new transaction.
    async fn begin(&self) -> Result<Box<dyn ArticleTx + '_>, StorageError>;

    /// Delete every article whose slug is not in `slugs`, together with its
    /// tag associations. Returns the number of articles removed.
    ///
    /// An empty `slugs` slice deletes nothing.
    async fn delete_articles_except(&self, slugs: &[&str]) -> Result<u64, StorageError>;

    /// Retrieve a stored article with its tags, by slug.
    async fn get_article(&self, slug: &str) -> Result<Option<StoredArticle>, StorageError>;

    /// All stored slugs, sorted.
    async fn list_slugs(&self) -> Result<Vec<String>, StorageError>;
}

/// Commit on success, roll back on failure.
///
/// A rollback failure is reported alongside the error that caused it.
pub async fn commit_if_ok<T>(
    tx: Box<dyn ArticleTx + '_>,
    result: Result<T, StorageError>,
) -> Result<T, StorageError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                return Err(StorageError::Backend(format!(
                    "failed rolling back transaction with error \"{rollback_err}\" while handling error: {err}"
                )));
            }
            Err(err)
        }
    }
}
