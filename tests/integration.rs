use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn artsync_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_artsync"))
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let articles_dir = root.join("articles");
    fs::create_dir_all(&articles_dir).unwrap();
    fs::write(
        articles_dir.join("2020-01-02.alpha.md"),
        "title: Alpha\ndate: 2020-01-02 08:00:00\ntags: rust, cli\n\nAlpha intro.\n\n~~more~~\n\nAlpha body about *cargo*.\n",
    )
    .unwrap();
    fs::write(
        articles_dir.join("beta.md"),
        "title: Beta\ndate: 2020-02-03 09:30:00\ntags: python\n\nBeta & friends.\n",
    )
    .unwrap();
    fs::write(
        articles_dir.join("gamma.md"),
        "Title: Gamma\nDate: 2020-03-04 10:45:00\nHidden: yes\n\nGamma is hidden.\n",
    )
    .unwrap();

    let config_content = format!(
        r#"[db]
path = "{root}/data/articles.sqlite"

[articles]
dirs = ["{root}/articles"]
include_globs = ["*.md"]
"#,
        root = root.display()
    );

    let config_path = config_dir.join("articles.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_artsync(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = artsync_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run artsync binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_artsync(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data").join("articles.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_artsync(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_artsync(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_update_inserts_all_articles() {
    let (_tmp, config_path) = setup_test_env();

    run_artsync(&config_path, &["init"]);
    let (stdout, stderr, success) = run_artsync(&config_path, &["update", "--progress", "off"]);
    assert!(success, "update failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("loaded: 3 articles"), "{}", stdout);
    assert!(stdout.contains("inserted: 3"), "{}", stdout);
    assert!(stdout.contains("removed stale: 0"), "{}", stdout);
    assert!(stdout.contains("ok"));
}

#[test]
fn test_update_twice_updates_in_place() {
    let (_tmp, config_path) = setup_test_env();

    run_artsync(&config_path, &["init"]);
    run_artsync(&config_path, &["update", "--progress", "off"]);
    let (stdout, _, success) = run_artsync(&config_path, &["update", "--progress", "off"]);
    assert!(success);
    assert!(stdout.contains("inserted: 0"), "{}", stdout);
    assert!(stdout.contains("updated: 3"), "{}", stdout);
}

#[test]
fn test_update_removes_deleted_sources() {
    let (tmp, config_path) = setup_test_env();

    run_artsync(&config_path, &["init"]);
    run_artsync(&config_path, &["update", "--progress", "off"]);

    fs::remove_file(tmp.path().join("articles").join("beta.md")).unwrap();
    let (stdout, _, success) = run_artsync(&config_path, &["update", "--progress", "off"]);
    assert!(success);
    assert!(stdout.contains("removed stale: 1"), "{}", stdout);

    let (_, _, found) = run_artsync(&config_path, &["show", "beta"]);
    assert!(!found, "beta should be gone after its source was removed");
}

#[test]
fn test_update_with_no_sources_keeps_existing_articles() {
    let (tmp, config_path) = setup_test_env();

    run_artsync(&config_path, &["init"]);
    run_artsync(&config_path, &["update", "--progress", "off"]);

    for name in ["2020-01-02.alpha.md", "beta.md", "gamma.md"] {
        fs::remove_file(tmp.path().join("articles").join(name)).unwrap();
    }
    let (stdout, _, success) = run_artsync(&config_path, &["update", "--progress", "off"]);
    assert!(success);
    assert!(stdout.contains("removed stale: skipped"), "{}", stdout);

    let (_, _, found) = run_artsync(&config_path, &["show", "beta"]);
    assert!(found, "empty batch must not delete anything");
}

#[test]
fn test_update_broken_article_fails_without_writing() {
    let (tmp, config_path) = setup_test_env();

    run_artsync(&config_path, &["init"]);
    fs::write(
        tmp.path().join("articles").join("broken.md"),
        "title: Broken\nthis line has no separator\n\nbody\n",
    )
    .unwrap();

    let (_, stderr, success) = run_artsync(&config_path, &["update", "--progress", "off"]);
    assert!(!success, "update should fail on a broken header");
    assert!(stderr.contains("broken.md"), "stderr: {}", stderr);

    let (_, _, found) = run_artsync(&config_path, &["show", "beta"]);
    assert!(!found, "nothing should have been written");
}

#[test]
fn test_update_dry_run() {
    let (_tmp, config_path) = setup_test_env();

    run_artsync(&config_path, &["init"]);
    let (stdout, _, success) =
        run_artsync(&config_path, &["update", "--dry-run", "--progress", "off"]);
    assert!(success);
    assert!(stdout.contains("dry-run"));
    assert!(stdout.contains("loaded: 3 articles"));
    assert!(stdout.contains("gamma  Gamma  (hidden)"), "{}", stdout);

    let (_, _, found) = run_artsync(&config_path, &["show", "beta"]);
    assert!(!found, "dry run must not write");
}

#[test]
fn test_show_article() {
    let (_tmp, config_path) = setup_test_env();

    run_artsync(&config_path, &["init"]);
    run_artsync(&config_path, &["update", "--progress", "off"]);

    let (stdout, stderr, success) = run_artsync(&config_path, &["show", "2020-01-02.alpha"]);
    assert!(success, "show failed: {}", stderr);
    assert!(stdout.contains("title:     Alpha"));
    assert!(stdout.contains("published: 2020-01-02 08:00:00"));
    assert!(stdout.contains("tags:      cli, rust"));
    assert!(stdout.contains("<p>Alpha intro.</p>"));
    assert!(stdout.contains("<em>cargo</em>"));
}

#[test]
fn test_show_json() {
    let (_tmp, config_path) = setup_test_env();

    run_artsync(&config_path, &["init"]);
    run_artsync(&config_path, &["update", "--progress", "off"]);

    let (stdout, _, success) = run_artsync(&config_path, &["show", "beta", "--json"]);
    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["slug"], "beta");
    assert_eq!(value["summary_html"], serde_json::Value::Null);
    assert_eq!(value["full_plain"], "Beta & friends.\n");
}

#[test]
fn test_show_missing_article_fails() {
    let (_tmp, config_path) = setup_test_env();

    run_artsync(&config_path, &["init"]);
    let (_, stderr, success) = run_artsync(&config_path, &["show", "nope"]);
    assert!(!success);
    assert!(stderr.contains("article not found"));
}

#[test]
fn test_sources_lists_directories() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_artsync(&config_path, &["sources"]);
    assert!(success);
    assert!(stdout.contains("OK"));
    assert!(stdout.contains("notify: not configured"));
}

#[test]
fn test_missing_config_fails() {
    let (tmp, _config_path) = setup_test_env();

    let (_, stderr, success) = run_artsync(&tmp.path().join("nope.toml"), &["init"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
