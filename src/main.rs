//! # article-sync CLI (`artsync`)
//!
//! ## Usage
//!
//! ```bash
//! artsync --config ./config/articles.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `artsync init` | Create the SQLite database and tables |
//! | `artsync sources` | List configured article directories and their status |
//! | `artsync update` | Load all articles, sync them, notify the server |
//! | `artsync show <slug>` | Print a stored article |
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (default `article_sync=info`).

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use article_sync::config;
use article_sync::get;
use article_sync::ingest::{self, UpdateOptions};
use article_sync::migrate;
use article_sync::progress::ProgressMode;
use article_sync::sources;

/// article-sync: load markdown articles and synchronize them into SQLite.
#[derive(Parser)]
#[command(
    name = "artsync",
    about = "Load markdown articles and synchronize them into SQLite",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `<user config dir>/article-sync/config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `article` and `article_tag`
    /// tables. Running it again is harmless.
    Init,

    /// List configured article directories and whether they can be read.
    Sources,

    /// Load every article and synchronize the database with it.
    ///
    /// Articles are upserted one transaction at a time, then every stored
    /// article without a source file is deleted. Finally the configured
    /// update URL is notified.
    Update {
        /// Parse all sources and list them without writing to the database.
        #[arg(long)]
        dry_run: bool,

        /// Do not notify the server after a successful update.
        #[arg(long)]
        no_notify: bool,

        /// Progress output on stderr. Defaults to `human` on a terminal, `off` otherwise.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Print a stored article.
    Show {
        /// Article slug (source filename without its extension).
        slug: String,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "article_sync=info,article_sync_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let cfg = config::load_config(&config_path)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Update {
            dry_run,
            no_notify,
            progress,
        } => {
            let opts = UpdateOptions {
                dry_run,
                no_notify,
                progress: progress.unwrap_or_else(ProgressMode::default_for_tty),
            };
            ingest::run_update(&cfg, opts).await?;
        }
        Commands::Show { slug, json } => {
            get::run_show(&cfg, &slug, json).await?;
        }
    }

    Ok(())
}
