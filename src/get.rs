//! Article retrieval by slug.
//!
//! Used by the `artsync show` command to inspect what an update stored.

use anyhow::{bail, Result};

use article_sync_core::models::{StoredArticle, PUBLISHED_FORMAT};
use article_sync_core::store::ArticleStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

pub async fn get_article(store: &dyn ArticleStore, slug: &str) -> Result<StoredArticle> {
    match store.get_article(slug).await? {
        Some(article) => Ok(article),
        None => bail!("article not found: {}", slug),
    }
}

/// CLI entry point: prints the stored article to stdout.
pub async fn run_show(config: &Config, slug: &str, json: bool) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let result = get_article(&store, slug).await;
    store.pool().close().await;
    let article = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&article)?);
        return Ok(());
    }

    println!("--- Article ---");
    println!("id:        {}", article.id);
    println!("slug:      {}", article.slug);
    println!("title:     {}", article.title);
    println!("published: {}", article.published.format(PUBLISHED_FORMAT));
    println!("hidden:    {}", article.hidden);
    println!("tags:      {}", article.tags.join(", "));
    println!();

    println!("--- Summary ---");
    match &article.summary_html {
        Some(summary) => println!("{}", summary),
        None => println!("(none)"),
    }
    println!();

    println!("--- Full ---");
    println!("{}", article.full_html);
    println!();

    println!("--- Plain ---");
    println!("{}", article.full_plain);

    Ok(())
}
