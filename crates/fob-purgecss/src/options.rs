//! Purge request and result types

use regex::Regex;

use crate::extractor::{Extractor, ExtractorBinding};

/// A content file scanned for used selectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    /// File extension, e.g. `.html` or `html`
    pub extension: String,
    /// Full text of the file
    pub raw: String,
}

impl RawContent {
    pub fn new(extension: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            raw: raw.into(),
        }
    }
}

/// A stylesheet to purge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCss {
    pub raw: String,
    /// Optional name used in error messages and copied to the result
    pub name: Option<String>,
}

impl RawCss {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Everything the engine needs for one purge
#[derive(Debug, Clone, Default)]
pub struct PurgeOptions {
    pub content: Vec<RawContent>,
    pub css: Vec<RawCss>,
    pub default_extractor: Option<Extractor>,
    pub extractors: Vec<ExtractorBinding>,
    /// Selector names (class, id or tag, without prefix) that are always kept
    pub whitelist: Vec<String>,
    /// Keep any selector part matching one of these
    pub whitelist_patterns: Vec<Regex>,
    /// Keep the whole rule, children included, when any selector part matches
    pub whitelist_patterns_children: Vec<Regex>,
    /// Remove `@font-face` rules whose family is never used
    pub font_face: bool,
    /// Remove `@keyframes` rules that no animation references
    pub keyframes: bool,
    /// Remove custom properties that are never read through `var()`
    pub variables: bool,
    /// Report removed selectors in the result
    pub rejected: bool,
}

impl PurgeOptions {
    pub fn new(content: Vec<RawContent>, css: Vec<RawCss>) -> Self {
        Self {
            content,
            css,
            ..Default::default()
        }
    }
}

/// Outcome of purging one stylesheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeResult {
    /// The purged stylesheet text
    pub css: String,
    /// Name of the input stylesheet, if it had one
    pub name: Option<String>,
    /// Removed selectors, when `rejected` was requested
    pub rejected: Option<Vec<String>>,
}
