//! In-memory [`ArticleStore`] implementation for testing.
//!
//! Tables live in a `BTreeMap` / `BTreeSet` pair behind `std::sync::RwLock`.
//! A transaction works on a snapshot taken at [`ArticleStore::begin`] and
//! writes it back on commit; rollback (or drop) just discards it.
//!
//! [`InMemoryStore::fail_tag_writes_for`] makes tag inserts for one slug
//! fail, which is how the tests drive the rollback path.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::StorageError;
use crate::models::{ArticleRow, StoredArticle, TagSet};

use super::{ArticleStore, ArticleTx};

#[derive(Debug, Clone)]
struct StoredRow {
    slug: String,
    published: NaiveDateTime,
    hidden: bool,
    title: String,
    summary_html: Option<String>,
    full_html: String,
    full_plain: String,
}

impl StoredRow {
    fn from_row(row: &ArticleRow<'_>) -> Self {
        Self {
            slug: row.slug.to_string(),
            published: row.published,
            hidden: row.hidden,
            title: row.title.to_string(),
            summary_html: row.summary_html.map(str::to_string),
            full_html: row.full_html.to_string(),
            full_plain: row.full_plain.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Tables {
    next_id: i64,
    articles: BTreeMap<i64, StoredRow>,
    /// `(article_id, tag)`; the pair is the whole key.
    tags: BTreeSet<(i64, String)>,
}

/// In-memory store for tests.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    fail_tags_for: RwLock<Option<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                next_id: 1,
                ..Tables::default()
            }),
            fail_tags_for: RwLock::new(None),
        }
    }

    /// Make every subsequent `insert_tags` for the article with this slug fail.
    pub fn fail_tag_writes_for(&self, slug: impl Into<String>) {
        if let Ok(mut guard) = self.fail_tags_for.write() {
            *guard = Some(slug.into());
        }
    }

    /// Number of stored `(article, tag)` associations.
    pub fn tag_association_count(&self) -> usize {
        self.tables.read().map(|t| t.tags.len()).unwrap_or(0)
    }

    fn snapshot(&self) -> Result<Tables, StorageError> {
        self.tables
            .read()
            .map(|t| t.clone())
            .map_err(|_| poisoned())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StorageError {
    StorageError::Backend("in-memory store lock poisoned".to_string())
}

/// Transaction over a private copy of the tables.
struct MemoryTx<'a> {
    store: &'a InMemoryStore,
    staged: Tables,
}

#[async_trait]
impl ArticleTx for MemoryTx<'_> {
    async fn find_article_id(&mut self, slug: &str) -> Result<Option<i64>, StorageError> {
        Ok(self
            .staged
            .articles
            .iter()
            .find(|(_, row)| row.slug == slug)
            .map(|(id, _)| *id))
    }

    async fn insert_article(&mut self, row: &ArticleRow<'_>) -> Result<i64, StorageError> {
        if self.staged.articles.values().any(|r| r.slug == row.slug) {
            return Err(StorageError::Backend(format!(
                "duplicate slug: {}",
                row.slug
            )));
        }
        let id = self.staged.next_id;
        self.staged.next_id += 1;
        self.staged.articles.insert(id, StoredRow::from_row(row));
        Ok(id)
    }

    async fn update_article(
        &mut self,
        id: i64,
        row: &ArticleRow<'_>,
    ) -> Result<(), StorageError> {
        if let Some(stored) = self.staged.articles.get_mut(&id) {
            let slug = std::mem::take(&mut stored.slug);
            *stored = StoredRow {
                slug,
                ..StoredRow::from_row(row)
            };
        }
        Ok(())
    }

    async fn delete_tags(&mut self, article_id: i64) -> Result<(), StorageError> {
        self.staged.tags.retain(|(id, _)| *id != article_id);
        Ok(())
    }

    async fn insert_tags(&mut self, article_id: i64, tags: &TagSet) -> Result<(), StorageError> {
        let failing = self
            .store
            .fail_tags_for
            .read()
            .map_err(|_| poisoned())?
            .clone();
        if let Some(slug) = failing {
            let target = self.staged.articles.get(&article_id).map(|r| &r.slug);
            if target == Some(&slug) {
                return Err(StorageError::Backend(format!(
                    "injected tag write failure for {slug}"
                )));
            }
        }

        for tag in tags {
            self.staged.tags.insert((article_id, tag.clone()));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let MemoryTx { store, staged } = *self;
        let mut tables = store.tables.write().map_err(|_| poisoned())?;
        *tables = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn ArticleTx + '_>, StorageError> {
        Ok(Box::new(MemoryTx {
            store: self,
            staged: self.snapshot()?,
        }))
    }

    async fn delete_articles_except(&self, slugs: &[&str]) -> Result<u64, StorageError> {
        if slugs.is_empty() {
            return Ok(0);
        }
        let keep: BTreeSet<&str> = slugs.iter().copied().collect();
        let mut tables = self.tables.write().map_err(|_| poisoned())?;

        let stale: Vec<i64> = tables
            .articles
            .iter()
            .filter(|(_, row)| !keep.contains(row.slug.as_str()))
            .map(|(id, _)| *id)
            .collect();

        for id in &stale {
            tables.articles.remove(id);
        }
        tables.tags.retain(|(id, _)| !stale.contains(id));

        Ok(stale.len() as u64)
    }

    async fn get_article(&self, slug: &str) -> Result<Option<StoredArticle>, StorageError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        let Some((id, row)) = tables.articles.iter().find(|(_, row)| row.slug == slug) else {
            return Ok(None);
        };

        let tags = tables
            .tags
            .iter()
            .filter(|(article_id, _)| article_id == id)
            .map(|(_, tag)| tag.clone())
            .collect();

        Ok(Some(StoredArticle {
            id: *id,
            slug: row.slug.clone(),
            published: row.published,
            hidden: row.hidden,
            title: row.title.clone(),
            summary_html: row.summary_html.clone(),
            full_html: row.full_html.clone(),
            full_plain: row.full_plain.clone(),
            tags,
        }))
    }

    async fn list_slugs(&self) -> Result<Vec<String>, StorageError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        let mut slugs: Vec<String> = tables.articles.values().map(|r| r.slug.clone()).collect();
        slugs.sort();
        Ok(slugs)
    }
}
