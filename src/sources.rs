use std::sync::Arc;

use anyhow::Result;

use article_sync_core::render::MarkdownRenderer;

use crate::config::Config;
use crate::loader::ArticleLoader;

/// Print every configured article directory with its status and file count.
pub fn list_sources(config: &Config) -> Result<()> {
    let loader = ArticleLoader::new(
        Arc::new(MarkdownRenderer::new()),
        &config.articles.include_globs,
    )?;

    println!("{:<48} {:<16} FILES", "DIRECTORY", "STATUS");
    for dir in &config.articles.dirs {
        let (status, files) = if !dir.exists() {
            ("MISSING", "-".to_string())
        } else if !dir.is_dir() {
            ("NOT A DIRECTORY", "-".to_string())
        } else {
            match loader.list_dir(dir) {
                Ok(paths) => ("OK", paths.len().to_string()),
                Err(_) => ("UNREADABLE", "-".to_string()),
            }
        };
        println!("{:<48} {:<16} {}", dir.display(), status, files);
    }

    match &config.notify {
        Some(notify) => println!("\nnotify: {}", notify.update_url),
        None => println!("\nnotify: not configured"),
    }

    Ok(())
}
