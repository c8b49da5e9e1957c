//! # article-sync
//!
//! Loads author-written article source files (a `key: value` header block
//! followed by a markdown body) and synchronizes them into SQLite, where a
//! separate web process serves them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────┐   ┌──────────┐
//! │ Source dirs │──▶│ ArticleLoader│──▶│SyncEngine│──▶│  SQLite   │
//! │  *.md       │   │ header+body  │   │ upsert + │   │ article + │
//! └─────────────┘   └──────────────┘   │ reconcile│   │ article_tag
//!                                      └────┬─────┘   └──────────┘
//!                                           ▼
//!                                     POST update_url
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! artsync init                  # create database
//! artsync update --dry-run      # parse every source, write nothing
//! artsync update                # sync and notify the server
//! artsync show my-post          # inspect a stored article
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`loader`] | Source directory scanning and file loading |
//! | [`sqlite_store`] | SQLite implementation of the store trait |
//! | [`ingest`] | The `update` pipeline |
//! | [`notify`] | Post-update server notification |
//! | [`get`] | Stored article retrieval |
//! | [`progress`] | Stderr progress reporters |
//! | [`sources`] | Source directory status listing |
//!
//! Parsing, rendering, the store trait and the sync engine live in the
//! `article-sync-core` crate.

pub mod config;
pub mod db;
pub mod get;
pub mod ingest;
pub mod loader;
pub mod migrate;
pub mod notify;
pub mod progress;
pub mod sources;
pub mod sqlite_store;
