//! Transactional synchronization of a batch of articles into storage.
//!
//! # Algorithm
//!
//! 1. Refuse batches in which two articles share a slug.
//! 2. For every article, in its own transaction: look the slug up, update
//!    the existing row or insert a new one, then replace the article's tag
//!    associations wholesale (delete all, insert current set). Commit, or
//!    roll back and stop the run on the first error.
//! 3. Once every article has committed, delete all stored articles whose
//!    slug is not in the batch. Skipped entirely for an empty batch.
//!
//! Runs are strictly sequential. Two concurrent runs over different source
//! sets would race each other in step 3; only one ingestion process may run
//! at a time.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::error::StorageError;
use crate::models::{Article, ArticleRow};
use crate::progress::{NoProgress, SyncProgressEvent, SyncProgressReporter};
use crate::store::{commit_if_ok, ArticleStore, ArticleTx};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("duplicate slug in batch: {0}")]
    DuplicateSlug(String),

    #[error("saving article {slug:?} failed: {source}")]
    Save {
        slug: String,
        #[source]
        source: StorageError,
    },

    #[error("removing stale articles failed: {0}")]
    Reconcile(#[source] StorageError),
}

/// Whether an upsert created a new row or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    Updated,
}

/// Counters for one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: u64,
    pub updated: u64,
    pub tags_written: u64,
    /// Articles removed by reconciliation. Zero when it was skipped.
    pub deleted: u64,
    /// `false` when the batch was empty and reconciliation did not run.
    pub reconciled: bool,
}

/// Writes article batches into an [`ArticleStore`].
pub struct SyncEngine {
    store: Arc<dyn ArticleStore>,
    progress: Box<dyn SyncProgressReporter>,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self {
            store,
            progress: Box::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Box<dyn SyncProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Upsert every article, then reconcile.
    pub async fn sync(&self, articles: &[Article]) -> Result<SyncReport, SyncError> {
        check_unique_slugs(articles)?;

        let total = articles.len() as u64;
        let mut report = SyncReport::default();

        for (n, article) in articles.iter().enumerate() {
            let outcome = self
                .save_article(article)
                .await
                .map_err(|source| SyncError::Save {
                    slug: article.slug.clone(),
                    source,
                })?;

            match outcome {
                SaveOutcome::Inserted => report.inserted += 1,
                SaveOutcome::Updated => report.updated += 1,
            }
            report.tags_written += article.tags.len() as u64;

            tracing::debug!(slug = %article.slug, ?outcome, tags = article.tags.len(), "article saved");
            self.progress.report(SyncProgressEvent::Syncing {
                n: n as u64 + 1,
                total,
            });
        }

        if articles.is_empty() {
            tracing::warn!("empty batch, skipping removal of stale articles");
            return Ok(report);
        }

        let slugs: Vec<&str> = articles.iter().map(|a| a.slug.as_str()).collect();
        report.deleted = self
            .store
            .delete_articles_except(&slugs)
            .await
            .map_err(SyncError::Reconcile)?;
        report.reconciled = true;

        if report.deleted > 0 {
            tracing::info!(deleted = report.deleted, "removed stale articles");
        }
        self.progress.report(SyncProgressEvent::Reconciled {
            deleted: report.deleted,
        });

        Ok(report)
    }

    /// Upsert a single article and replace its tags, in one transaction.
    pub async fn save_article(&self, article: &Article) -> Result<SaveOutcome, StorageError> {
        let mut tx = self.store.begin().await?;
        let result = save_in_tx(tx.as_mut(), article).await;
        commit_if_ok(tx, result).await
    }
}

async fn save_in_tx<T>(tx: &mut T, article: &Article) -> Result<SaveOutcome, StorageError>
where
    T: ArticleTx + ?Sized,
{
    let row = ArticleRow::from(article);

    let (id, outcome) = match tx.find_article_id(&article.slug).await? {
        Some(id) => {
            tx.update_article(id, &row).await?;
            (id, SaveOutcome::Updated)
        }
        None => (tx.insert_article(&row).await?, SaveOutcome::Inserted),
    };

    tx.delete_tags(id).await?;
    tx.insert_tags(id, &article.tags).await?;

    Ok(outcome)
}

fn check_unique_slugs(articles: &[Article]) -> Result<(), SyncError> {
    let mut seen = HashSet::with_capacity(articles.len());
    for article in articles {
        if !seen.insert(article.slug.as_str()) {
            return Err(SyncError::DuplicateSlug(article.slug.clone()));
        }
    }
    Ok(())
}
