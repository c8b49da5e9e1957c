//! The `update` pipeline.
//!
//! Coordinates a full run: load every configured directory → sync the batch
//! into the store → notify the serving process. Any error aborts the run;
//! nothing is retried.

use std::sync::Arc;

use anyhow::{Context, Result};

use article_sync_core::models::Article;
use article_sync_core::progress::SyncProgressReporter;
use article_sync_core::render::{MarkdownRenderer, Renderer};
use article_sync_core::store::ArticleStore;
use article_sync_core::sync::{SyncEngine, SyncReport};

use crate::config::Config;
use crate::db;
use crate::loader::ArticleLoader;
use crate::notify;
use crate::progress::ProgressMode;
use crate::sqlite_store::SqliteStore;

/// Flags of `artsync update`.
#[derive(Debug, Clone, Copy)]
pub struct UpdateOptions {
    /// Load and validate all sources without touching the database.
    pub dry_run: bool,
    /// Skip the post-update notification even if `[notify]` is configured.
    pub no_notify: bool,
    pub progress: ProgressMode,
}

/// Explicit dependencies of one update run.
pub struct Pipeline {
    pub loader: ArticleLoader,
    pub store: Arc<dyn ArticleStore>,
}

impl Pipeline {
    pub fn new(
        config: &Config,
        renderer: Arc<dyn Renderer>,
        store: Arc<dyn ArticleStore>,
    ) -> Result<Self> {
        let loader = ArticleLoader::new(renderer, &config.articles.include_globs)?;
        Ok(Self { loader, store })
    }

    pub fn load(
        &self,
        config: &Config,
        progress: &dyn SyncProgressReporter,
    ) -> Result<Vec<Article>> {
        Ok(self.loader.load_dirs(&config.articles.dirs, progress)?)
    }

    /// Load everything, then sync it. Nothing is written if loading fails.
    pub async fn run(
        &self,
        config: &Config,
        progress: Box<dyn SyncProgressReporter>,
    ) -> Result<(usize, SyncReport)> {
        let articles = self.load(config, progress.as_ref())?;
        let engine = SyncEngine::new(self.store.clone()).with_progress(progress);
        let report = engine.sync(&articles).await?;
        Ok((articles.len(), report))
    }
}

pub async fn run_update(config: &Config, opts: UpdateOptions) -> Result<()> {
    let renderer: Arc<dyn Renderer> = Arc::new(MarkdownRenderer::new());

    if opts.dry_run {
        let loader = ArticleLoader::new(renderer, &config.articles.include_globs)?;
        let progress = opts.progress.reporter();
        let articles = loader.load_dirs(&config.articles.dirs, progress.as_ref())?;

        println!("update (dry-run)");
        println!("  loaded: {} articles", articles.len());
        for article in &articles {
            let hidden = if article.hidden { "  (hidden)" } else { "" };
            println!("    {}  {}{}", article.slug, article.title, hidden);
        }
        return Ok(());
    }

    let pool = db::connect(config).await?;
    let store = Arc::new(SqliteStore::new(pool.clone()));
    let pipeline = Pipeline::new(config, renderer, store)?;

    let result = pipeline.run(config, opts.progress.reporter()).await;
    pool.close().await;
    let (loaded, report) = result?;

    tracing::info!(
        loaded,
        inserted = report.inserted,
        updated = report.updated,
        deleted = report.deleted,
        "update finished"
    );

    println!("update");
    println!("  loaded: {} articles", loaded);
    println!("  inserted: {}", report.inserted);
    println!("  updated: {}", report.updated);
    println!("  tags written: {}", report.tags_written);
    if report.reconciled {
        println!("  removed stale: {}", report.deleted);
    } else {
        println!("  removed stale: skipped (no articles loaded)");
    }

    match &config.notify {
        Some(notify_config) if !opts.no_notify => {
            notify::notify_update(notify_config)
                .await
                .context("articles were synced, but notifying the server failed")?;
            println!("  notified: {}", notify_config.update_url);
        }
        _ => {}
    }

    println!("ok");
    Ok(())
}
