//! Error kinds raised while loading and storing articles.

use thiserror::Error;

/// Failure of the markdown renderer.
#[derive(Debug, Error)]
#[error("markdown rendering failed: {0}")]
pub struct RenderError(pub String);

/// Anything that aborts the load of a single article source file.
#[derive(Debug, Error)]
pub enum ArticleError {
    /// A header line has no `key: value` separator.
    #[error("The article header is broken: {line:?}")]
    BrokenHeader { line: String },

    /// The header block ended without a `title` or a `date`.
    #[error("The article header is missing some mandatory headers")]
    MissingMandatoryHeaders,

    #[error("invalid date {value:?}: {source}")]
    DateFormat {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A transactional read or write against the article store failed.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Native driver error of the backend (e.g. `sqlx::Error`).
    #[error("database error: {0}")]
    Db(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn db<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StorageError::Db(Box::new(err))
    }
}
