//! Integration tests for the PurgeCSS loader
//!
//! These tests drive the loader end to end: options in, content files read
//! from disk, dependencies recorded, purged stylesheet out.

use fob_plugin_purgecss::{
    Extractor, PurgeLoader, PurgeLoaderError, PurgeLoaderOptions, RecordingTracker,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CSS: &str = ".used { color: red; } .unused { color: blue; }";

/// Helper to write a content file under `dir`
fn create_content_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(name);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(&file_path, content).expect("Failed to write test file");
    file_path
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests")
}

#[tokio::test]
async fn test_unused_selector_is_removed() {
    let loader = PurgeLoader::new(PurgeLoaderOptions::new(["fixtures/index.html"]))
        .with_cwd(fixtures_root());
    let tracker = RecordingTracker::new();

    let css = loader.load(CSS, &tracker).await.unwrap();

    assert!(css.contains(".used"));
    assert!(!css.contains(".unused"));
    assert_eq!(
        tracker.dependencies(),
        vec![fixtures_root().join("fixtures/index.html")]
    );
}

#[tokio::test]
async fn test_whitelisted_selector_is_kept() {
    let options = PurgeLoaderOptions::from_value(json!({
        "content": ["fixtures/index.html"],
        "whitelist": ["unused"]
    }))
    .unwrap();
    let loader = PurgeLoader::new(options).with_cwd(fixtures_root());

    let css = loader.load(CSS, &RecordingTracker::new()).await.unwrap();

    assert!(css.contains(".used"));
    assert!(css.contains(".unused"));
}

#[tokio::test]
async fn test_loader_is_idempotent() {
    let loader = PurgeLoader::new(PurgeLoaderOptions::new(["fixtures/index.html"]))
        .with_cwd(fixtures_root());

    let once = loader.load(CSS, &RecordingTracker::new()).await.unwrap();
    let twice = loader.load(&once, &RecordingTracker::new()).await.unwrap();

    assert_eq!(once, twice);
}

#[test]
fn test_empty_content_is_rejected_before_io() {
    let loader = PurgeLoader::new(PurgeLoaderOptions::new(Vec::<String>::new()));
    let tracker = RecordingTracker::new();

    let err = loader.prepare(CSS, &tracker).unwrap_err();

    assert!(matches!(err, PurgeLoaderError::EmptyContent));
    assert_eq!(
        err.to_string(),
        "You must provide a content file to analyse for PurgeCSS"
    );
    assert!(tracker.dependencies().is_empty());
}

#[test]
fn test_unknown_option_fails_validation() {
    let err = PurgeLoaderOptions::from_value(json!({
        "content": ["index.html"],
        "foo": 1
    }))
    .unwrap_err();

    assert!(matches!(err, PurgeLoaderError::Schema { .. }));
    assert!(err.is_setup_error());
}

#[test]
fn test_missing_file_is_not_registered() {
    let dir = TempDir::new().unwrap();
    let loader = PurgeLoader::new(PurgeLoaderOptions::new(["missing.html"])).with_cwd(dir.path());
    let tracker = RecordingTracker::new();

    let err = loader.prepare(CSS, &tracker).unwrap_err();

    match &err {
        PurgeLoaderError::NotFound { path } => assert_eq!(path, &dir.path().join("missing.html")),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(err.to_string().contains("doesn't exist"));
    assert!(tracker.dependencies().is_empty());
}

#[test]
fn test_directory_is_not_a_file() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("templates")).unwrap();
    let loader = PurgeLoader::new(PurgeLoaderOptions::new(["templates"])).with_cwd(dir.path());
    let tracker = RecordingTracker::new();

    let err = loader.prepare(CSS, &tracker).unwrap_err();

    assert!(matches!(err, PurgeLoaderError::NotAFile { .. }));
    assert!(err.to_string().ends_with("is not a file"));
    assert!(tracker.dependencies().is_empty());
}

#[test]
fn test_file_without_extension_fails() {
    let dir = TempDir::new().unwrap();
    let readme = create_content_file(&dir, "README", "used");
    let loader = PurgeLoader::new(PurgeLoaderOptions::new(["README"])).with_cwd(dir.path());
    let tracker = RecordingTracker::new();

    let err = loader.prepare(CSS, &tracker).unwrap_err();

    assert!(matches!(err, PurgeLoaderError::UndefinedExtension { .. }));
    assert!(err.to_string().contains("README"));
    assert_eq!(tracker.dependencies(), vec![readme]);
}

#[test]
fn test_unreadable_content_is_registered_then_fails() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.html");
    fs::write(&page, b"\xff\xfe<div>").expect("Failed to write test file");
    let loader = PurgeLoader::new(PurgeLoaderOptions::new(["page.html"])).with_cwd(dir.path());
    let tracker = RecordingTracker::new();

    let err = loader.prepare(CSS, &tracker).unwrap_err();

    match &err {
        PurgeLoaderError::Read { path, .. } => assert_eq!(path, &page),
        other => panic!("expected Read, got {other:?}"),
    }
    assert!(err.to_string().contains(&*page.to_string_lossy()));
    assert!(err.to_string().starts_with("Impossible to read the content of"));
    assert_eq!(tracker.dependencies(), vec![page]);
}

#[cfg(unix)]
#[test]
fn test_symlink_is_not_a_file() {
    let dir = TempDir::new().unwrap();
    let target = create_content_file(&dir, "real.html", "<div class=\"used\"></div>");
    std::os::unix::fs::symlink(&target, dir.path().join("link.html")).unwrap();
    let loader = PurgeLoader::new(PurgeLoaderOptions::new(["link.html"])).with_cwd(dir.path());
    let tracker = RecordingTracker::new();

    let err = loader.prepare(CSS, &tracker).unwrap_err();

    match &err {
        PurgeLoaderError::NotAFile { path } => assert_eq!(path, &dir.path().join("link.html")),
        other => panic!("expected NotAFile, got {other:?}"),
    }
    assert!(tracker.dependencies().is_empty());
}

#[test]
fn test_first_failure_aborts_remaining_entries() {
    let dir = TempDir::new().unwrap();
    let first = create_content_file(&dir, "a.html", "<div class=\"used\"></div>");
    create_content_file(&dir, "c.html", "<div></div>");
    let loader = PurgeLoader::new(PurgeLoaderOptions::new(["a.html", "b.html", "c.html"]))
        .with_cwd(dir.path());
    let tracker = RecordingTracker::new();

    let err = loader.prepare(CSS, &tracker).unwrap_err();

    assert!(matches!(err, PurgeLoaderError::NotFound { .. }));
    assert_eq!(tracker.dependencies(), vec![first]);
}

#[tokio::test]
async fn test_dependencies_follow_content_order() {
    let dir = TempDir::new().unwrap();
    let page = create_content_file(&dir, "views/page.twig", "<p class=\"used\"></p>");
    let layout = create_content_file(&dir, "layout.html", "<body></body>");
    let loader = PurgeLoader::new(PurgeLoaderOptions::new([
        "./views/../views/page.twig",
        "layout.html",
    ]))
    .with_cwd(dir.path());
    let tracker = RecordingTracker::new();

    let task = loader.prepare(CSS, &tracker).unwrap();

    assert_eq!(tracker.dependencies(), vec![page, layout]);
    let extensions: Vec<&str> = task
        .request()
        .content
        .iter()
        .map(|content| content.extension.as_str())
        .collect();
    assert_eq!(extensions, vec![".twig", ".html"]);

    let css = task.run().await.unwrap();
    assert!(css.contains(".used"));
    assert!(!css.contains(".unused"));
}

#[tokio::test]
async fn test_absolute_content_path() {
    let dir = TempDir::new().unwrap();
    let file = create_content_file(&dir, "index.html", "<a class=\"unused\"></a>");
    let loader = PurgeLoader::new(PurgeLoaderOptions::new([file.to_string_lossy()]))
        .with_cwd("/nonexistent");
    let tracker = RecordingTracker::new();

    let css = loader.load(CSS, &tracker).await.unwrap();

    assert!(css.contains(".unused"));
    assert!(!css.contains(".used"));
    assert_eq!(tracker.dependencies(), vec![file]);
}

#[tokio::test]
async fn test_extractor_bound_to_extension() {
    let dir = TempDir::new().unwrap();
    create_content_file(&dir, "app.vue", "<div :class=\"{ 'is-open': open }\"></div>");
    let options = PurgeLoaderOptions::new(["app.vue"]).with_extractor(
        ["vue"],
        Extractor::function(|content| {
            content
                .split(|c: char| !c.is_ascii_alphanumeric() && c != '-')
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect()
        }),
    );
    let loader = PurgeLoader::new(options).with_cwd(dir.path());

    let css = loader
        .load(".is-open { display: block; } .closed { display: none; }", &RecordingTracker::new())
        .await
        .unwrap();

    assert!(css.contains(".is-open"));
    assert!(!css.contains(".closed"));
}

#[tokio::test]
async fn test_options_flags_reach_the_engine() {
    let dir = TempDir::new().unwrap();
    create_content_file(&dir, "index.html", "<div class=\"spinner\"></div>");
    let options = PurgeLoaderOptions::from_value(json!({
        "content": ["index.html"],
        "keyframes": true,
        "rejected": true
    }))
    .unwrap();
    let loader = PurgeLoader::new(options).with_cwd(dir.path());

    let task = loader
        .prepare(
            "@keyframes spin { to { opacity: 0; } } \
             @keyframes fade { to { opacity: 1; } } \
             .spinner { animation: spin 1s; } .ghost { color: red; }",
            &RecordingTracker::new(),
        )
        .unwrap();
    assert!(task.request().keyframes);
    assert!(task.request().rejected);

    let css = task.run().await.unwrap();
    assert!(css.contains("spin"));
    assert!(!css.contains("fade"));
    assert!(!css.contains(".ghost"));
}

#[tokio::test]
async fn test_engine_failure_surfaces_from_run() {
    let loader = PurgeLoader::new(PurgeLoaderOptions::new(["fixtures/index.html"]))
        .with_cwd(fixtures_root());

    let task = loader.prepare(".a..b { color: red; }", &RecordingTracker::new()).unwrap();
    let err = task.run().await.unwrap_err();

    assert!(matches!(err, PurgeLoaderError::Engine(_)));
    assert!(!err.is_setup_error());
}
