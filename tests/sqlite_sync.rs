//! Sync engine against a real SQLite database.
//!
//! Each test gets its own database file in a temp directory, created with
//! the same schema `artsync init` writes.

use std::path::Path;
use std::sync::Arc;

use article_sync::config::{ArticlesConfig, Config, DbConfig};
use article_sync::db;
use article_sync::ingest::Pipeline;
use article_sync::migrate;
use article_sync::sqlite_store::SqliteStore;
use article_sync_core::models::{Article, TagSet, PUBLISHED_FORMAT};
use article_sync_core::progress::NoProgress;
use article_sync_core::render::MarkdownRenderer;
use article_sync_core::store::ArticleStore;
use article_sync_core::sync::{SyncEngine, SyncError};
use chrono::NaiveDateTime;
use tempfile::TempDir;

fn config_for(root: &Path) -> Config {
    Config {
        db: DbConfig {
            path: root.join("data").join("articles.sqlite"),
        },
        articles: ArticlesConfig {
            dirs: vec![root.join("articles")],
            include_globs: vec!["*.md".to_string()],
        },
        notify: None,
    }
}

async fn setup() -> (TempDir, Config, Arc<SqliteStore>) {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("articles")).unwrap();
    let config = config_for(tmp.path());
    let pool = db::connect(&config).await.unwrap();
    migrate::create_schema(&pool).await.unwrap();
    (tmp, config, Arc::new(SqliteStore::new(pool)))
}

fn article(slug: &str, tags: &[&str]) -> Article {
    Article {
        slug: slug.to_string(),
        published: NaiveDateTime::parse_from_str("2021-06-07 08:09:10", PUBLISHED_FORMAT).unwrap(),
        hidden: false,
        title: format!("About {slug}"),
        summary_html: Some("<p>teaser</p>\n".to_string()),
        full_html: "<p>teaser</p>\n<p>rest &lt;here&gt;</p>\n".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect::<TagSet>(),
    }
}

async fn tag_rows(store: &SqliteStore) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM article_tag")
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn stores_all_columns() {
    let (_tmp, _config, store) = setup().await;
    let engine = SyncEngine::new(store.clone());

    engine.sync(&[article("first", &["b", "a"])]).await.unwrap();

    let stored = store.get_article("first").await.unwrap().unwrap();
    assert_eq!(stored.title, "About first");
    assert_eq!(
        stored.published.format(PUBLISHED_FORMAT).to_string(),
        "2021-06-07 08:09:10"
    );
    assert_eq!(stored.summary_html.as_deref(), Some("<p>teaser</p>\n"));
    assert_eq!(stored.full_plain, "teaser\nrest <here>\n");
    assert_eq!(stored.tags, vec!["a", "b"]);
}

#[tokio::test]
async fn missing_summary_is_stored_as_null() {
    let (_tmp, _config, store) = setup().await;
    let mut a = article("plain", &[]);
    a.summary_html = None;

    SyncEngine::new(store.clone()).sync(&[a]).await.unwrap();

    let stored = store.get_article("plain").await.unwrap().unwrap();
    assert_eq!(stored.summary_html, None);
}

#[tokio::test]
async fn reconciliation_keeps_exactly_the_batch() {
    let (_tmp, _config, store) = setup().await;
    let engine = SyncEngine::new(store.clone());

    engine
        .sync(&[article("a", &["x"]), article("b", &["x"]), article("c", &["x", "y"])])
        .await
        .unwrap();
    let report = engine
        .sync(&[article("a", &["x"]), article("b", &["x"])])
        .await
        .unwrap();

    assert_eq!(report.deleted, 1);
    assert_eq!(store.list_slugs().await.unwrap(), vec!["a", "b"]);
    // Tags of the removed article went with it.
    assert_eq!(tag_rows(&store).await, 2);
}

#[tokio::test]
async fn empty_batch_leaves_store_untouched() {
    let (_tmp, _config, store) = setup().await;
    let engine = SyncEngine::new(store.clone());

    engine.sync(&[article("a", &[]), article("b", &[])]).await.unwrap();
    let report = engine.sync(&[]).await.unwrap();

    assert!(!report.reconciled);
    assert_eq!(store.list_slugs().await.unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn resync_is_idempotent_for_tags() {
    let (_tmp, _config, store) = setup().await;
    let engine = SyncEngine::new(store.clone());
    let a = article("a", &["rust", "sqlite", "blog"]);

    engine.sync(std::slice::from_ref(&a)).await.unwrap();
    let id_before = store.get_article("a").await.unwrap().unwrap().id;
    let report = engine.sync(std::slice::from_ref(&a)).await.unwrap();
    let id_after = store.get_article("a").await.unwrap().unwrap().id;

    assert_eq!(report.updated, 1);
    assert_eq!(id_before, id_after);
    assert_eq!(tag_rows(&store).await, 3);
}

#[tokio::test]
async fn failed_tag_write_rolls_back_article_update() {
    let (_tmp, _config, store) = setup().await;
    let engine = SyncEngine::new(store.clone());

    engine
        .sync(&[article("a", &["x"]), article("stale", &[])])
        .await
        .unwrap();

    sqlx::query(
        r#"
        CREATE TRIGGER refuse_boom_tag BEFORE INSERT ON article_tag
        WHEN NEW.tag = 'boom'
        BEGIN
            SELECT RAISE(ABORT, 'tag write refused');
        END
        "#,
    )
    .execute(store.pool())
    .await
    .unwrap();

    let mut changed = article("a", &["boom"]);
    changed.title = "Changed".to_string();
    let err = engine.sync(&[changed]).await.unwrap_err();
    assert!(matches!(err, SyncError::Save { ref slug, .. } if slug == "a"), "{err}");

    // Neither the row update nor the tag delete survived.
    let stored = store.get_article("a").await.unwrap().unwrap();
    assert_eq!(stored.title, "About a");
    assert_eq!(stored.tags, vec!["x"]);

    // Reconciliation did not run.
    assert!(store.get_article("stale").await.unwrap().is_some());
}

#[tokio::test]
async fn pipeline_loads_directory_and_syncs() {
    let (tmp, config, store) = setup().await;
    let dir = tmp.path().join("articles");
    std::fs::write(
        dir.join("2020-01-02.hello.md"),
        "title: Hello\ndate: 2020-01-02 10:00:00\ntags: intro, meta\n\nFirst *post*.\n~~more~~\nMore text.\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("secret.md"),
        "title: Secret\ndate: 2020-02-03 10:00:00\nhidden: yes\n\nShh.\n",
    )
    .unwrap();
    std::fs::write(dir.join("notes.txt"), "ignored by include globs").unwrap();

    let pipeline = Pipeline::new(&config, Arc::new(MarkdownRenderer::new()), store.clone()).unwrap();
    let (loaded, report) = pipeline.run(&config, Box::new(NoProgress)).await.unwrap();

    assert_eq!(loaded, 2);
    assert_eq!(report.inserted, 2);

    let hello = store.get_article("2020-01-02.hello").await.unwrap().unwrap();
    assert_eq!(hello.summary_html.as_deref(), Some("<p>First <em>post</em>.</p>\n"));
    assert_eq!(hello.full_html, "<p>First <em>post</em>.\nMore text.</p>\n");
    assert_eq!(hello.tags, vec!["intro", "meta"]);

    let secret = store.get_article("secret").await.unwrap().unwrap();
    assert!(secret.hidden);

    // Removing a source file removes the article on the next run.
    std::fs::remove_file(dir.join("secret.md")).unwrap();
    let (_, report) = pipeline.run(&config, Box::new(NoProgress)).await.unwrap();
    assert_eq!(report.deleted, 1);
    assert!(store.get_article("secret").await.unwrap().is_none());
}

#[tokio::test]
async fn broken_source_aborts_before_any_write() {
    let (tmp, config, store) = setup().await;
    let dir = tmp.path().join("articles");
    std::fs::write(dir.join("a.md"), "title: A\ndate: 2020-01-02 10:00:00\n\nok\n").unwrap();
    std::fs::write(dir.join("b.md"), "title: B\n\nno date\n").unwrap();

    let pipeline = Pipeline::new(&config, Arc::new(MarkdownRenderer::new()), store.clone()).unwrap();
    let err = pipeline.run(&config, Box::new(NoProgress)).await.unwrap_err();

    assert!(err.to_string().contains("b.md"), "{err}");
    assert!(store.list_slugs().await.unwrap().is_empty());
}
