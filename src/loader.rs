//! Loading article source files from disk.
//!
//! Each configured directory is listed non-recursively; every entry that is
//! not a directory and whose file name matches the include globs is parsed
//! into an [`Article`]. Files are visited in file-name order so that runs
//! are deterministic.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use thiserror::Error;
use walkdir::WalkDir;

use article_sync_core::article::{parse_article, slug_from_path};
use article_sync_core::error::ArticleError;
use article_sync_core::models::Article;
use article_sync_core::progress::{SyncProgressEvent, SyncProgressReporter};
use article_sync_core::render::Renderer;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to list article directory {}: {source}", dir.display())]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to load article {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: ArticleError,
    },

    #[error("invalid include glob: {0}")]
    Glob(#[from] globset::Error),
}

/// Reads article source files, rendering bodies with the injected renderer.
pub struct ArticleLoader {
    renderer: Arc<dyn Renderer>,
    include: GlobSet,
}

impl ArticleLoader {
    pub fn new(renderer: Arc<dyn Renderer>, include_globs: &[String]) -> Result<Self, LoadError> {
        Ok(Self {
            renderer,
            include: build_globset(include_globs)?,
        })
    }

    /// Load a single source file. Errors come back exactly as the parser
    /// raised them; failing to open the file is [`ArticleError::Io`].
    pub fn load_article(&self, path: &Path) -> Result<Article, ArticleError> {
        let slug = slug_from_path(path);
        let file = File::open(path)?;
        parse_article(BufReader::new(file), slug, self.renderer.as_ref())
    }

    /// Source files in `dir` that the loader would pick up, in file-name order.
    pub fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        let mut paths = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source| LoadError::ReadDir {
                dir: dir.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !self.include.is_match(name.as_ref()) {
                tracing::debug!(path = %entry.path().display(), "skipping file not matching include globs");
                continue;
            }

            paths.push(entry.into_path());
        }

        Ok(paths)
    }

    pub fn load_dir(&self, dir: &Path) -> Result<Vec<Article>, LoadError> {
        let paths = self.list_dir(dir)?;
        let mut articles = Vec::with_capacity(paths.len());

        for path in paths {
            let article = self
                .load_article(&path)
                .map_err(|source| LoadError::Load {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!(slug = %article.slug, path = %path.display(), "loaded article");
            articles.push(article);
        }

        Ok(articles)
    }

    /// Load every configured directory, in order, into one batch.
    pub fn load_dirs(
        &self,
        dirs: &[PathBuf],
        progress: &dyn SyncProgressReporter,
    ) -> Result<Vec<Article>, LoadError> {
        let mut articles = Vec::new();
        for dir in dirs {
            progress.report(SyncProgressEvent::Loading { dir: dir.clone() });
            let loaded = self.load_dir(dir)?;
            tracing::info!(dir = %dir.display(), count = loaded.len(), "loaded articles");
            articles.extend(loaded);
        }
        Ok(articles)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}
