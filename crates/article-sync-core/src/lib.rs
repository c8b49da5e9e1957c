//! # article-sync core
//!
//! Shared logic for article-sync: the article model, source file parsing
//! (header block + markdown body), the plain-text projection used for
//! search, the storage abstraction, and the sync engine.
//!
//! This crate contains no tokio runtime, sqlx, or filesystem I/O. Parsing
//! works on any [`std::io::BufRead`], and storage is reached only through
//! the [`store::ArticleStore`] trait.

pub mod article;
pub mod body;
pub mod error;
pub mod header;
pub mod models;
pub mod plain;
pub mod progress;
pub mod render;
pub mod store;
pub mod sync;
