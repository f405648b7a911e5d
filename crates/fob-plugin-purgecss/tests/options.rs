//! Integration tests for loading PurgeCSS loader options

use fob_plugin_purgecss::{PurgeLoaderError, PurgeLoaderOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_from_json() {
    let options = PurgeLoaderOptions::from_json(
        r#"{
            "content": ["index.html", "about.html"],
            "defaultExtractor": "[\\w:/-]+",
            "extractors": [{ "extractor": "[a-z-]+", "extensions": ["vue", "svelte"] }],
            "whitelistPatterns": ["^btn-"],
            "whitelistPatternsChildren": ["^modal"],
            "fontFace": true,
            "variables": true
        }"#,
    )
    .unwrap();

    assert_eq!(options.content, vec!["index.html", "about.html"]);
    assert!(options.default_extractor.is_some());
    assert_eq!(options.extractors.len(), 1);
    assert_eq!(options.extractors[0].extensions, vec!["vue", "svelte"]);
    assert!(options.whitelist_patterns[0].is_match("btn-primary"));
    assert!(options.whitelist_patterns_children[0].is_match("modal-body"));
    assert!(options.font_face);
    assert!(options.variables);
    assert!(!options.keyframes);
    assert!(!options.rejected);
}

#[test]
fn test_from_json_file() {
    let options = PurgeLoaderOptions::from_file(fixture("purgecss.json")).unwrap();

    assert_eq!(options.content, vec!["fixtures/index.html"]);
    assert_eq!(options.whitelist, vec!["unused"]);
    assert!(options.rejected);
}

#[test]
fn test_from_toml_file() {
    let options = PurgeLoaderOptions::from_file(fixture("purgecss.toml")).unwrap();

    assert_eq!(options.content, vec!["fixtures/index.html"]);
    assert_eq!(options.whitelist_patterns.len(), 1);
    assert!(options.keyframes);
}

#[test]
fn test_missing_config_file() {
    let err = PurgeLoaderOptions::from_file("/nonexistent/purgecss.json").unwrap_err();
    assert!(matches!(err, PurgeLoaderError::ConfigFile { .. }));
}

#[test]
fn test_unsupported_config_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("purgecss.yaml");
    fs::write(&path, "content: [index.html]").unwrap();

    let err = PurgeLoaderOptions::from_file(&path).unwrap_err();
    assert!(matches!(err, PurgeLoaderError::ConfigFile { .. }));
    assert!(err.to_string().contains("unsupported format"));
}

#[test]
fn test_unknown_key_in_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("purgecss.toml");
    fs::write(&path, "content = [\"index.html\"]\nsafelist = [\"a\"]\n").unwrap();

    let err = PurgeLoaderOptions::from_file(&path).unwrap_err();
    assert!(matches!(err, PurgeLoaderError::Schema { .. }));
}

#[test]
fn test_content_is_required() {
    let err = PurgeLoaderOptions::from_json(r#"{ "whitelist": ["a"] }"#).unwrap_err();
    assert!(matches!(err, PurgeLoaderError::Schema { .. }));
}

#[test]
fn test_empty_content_list() {
    let err = PurgeLoaderOptions::from_json(r#"{ "content": [] }"#).unwrap_err();
    assert!(matches!(err, PurgeLoaderError::EmptyContent));
}

#[test]
fn test_wrong_types_are_all_reported() {
    let err = PurgeLoaderOptions::from_json(
        r#"{ "content": "index.html", "fontFace": "yes" }"#,
    )
    .unwrap_err();

    match err {
        PurgeLoaderError::Schema { errors } => assert_eq!(errors.len(), 2),
        other => panic!("expected Schema, got {other:?}"),
    }
}

#[test]
fn test_invalid_regex() {
    let err = PurgeLoaderOptions::from_json(
        r#"{ "content": ["index.html"], "whitelistPatterns": ["(unclosed"] }"#,
    )
    .unwrap_err();

    match &err {
        PurgeLoaderError::InvalidOption { option, .. } => assert_eq!(option, "whitelistPatterns"),
        other => panic!("expected InvalidOption, got {other:?}"),
    }
    assert!(err.is_setup_error());
}

#[test]
fn test_malformed_json() {
    let err = PurgeLoaderOptions::from_json("{ content: ").unwrap_err();
    assert!(matches!(err, PurgeLoaderError::Schema { .. }));
}
