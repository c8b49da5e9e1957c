//! TOML configuration.
//!
//! ```toml
//! [db]
//! path = "./data/articles.sqlite"
//!
//! [articles]
//! dirs = ["./content/articles", "./content/notes"]
//! include_globs = ["*.md"]   # optional, default: every file
//!
//! [notify]                   # optional
//! update_url = "https://example.org/update"
//! secret = "s3cret"
//! ```

use anyhow::{bail, Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub articles: ArticlesConfig,
    #[serde(default)]
    pub notify: Option<NotifyConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArticlesConfig {
    /// Directories holding article source files. Not searched recursively.
    pub dirs: Vec<PathBuf>,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
}

fn default_include_globs() -> Vec<String> {
    vec!["*".to_string()]
}

/// Where to signal the serving process after a successful update.
#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    pub update_url: String,
    pub secret: String,
}

/// `<user config dir>/article-sync/config.toml`, used when `--config` is not given.
pub fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Could not determine the user config directory")?;
    Ok(dir.join("article-sync").join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.articles.dirs.is_empty() {
        bail!("articles.dirs must list at least one directory");
    }

    if config.articles.include_globs.is_empty() {
        bail!("articles.include_globs must not be empty");
    }
    for pattern in &config.articles.include_globs {
        Glob::new(pattern)
            .with_context(|| format!("Invalid articles.include_globs pattern: '{}'", pattern))?;
    }

    if let Some(notify) = &config.notify {
        if notify.update_url.trim().is_empty() {
            bail!("notify.update_url must not be empty");
        }
    }

    Ok(config)
}
