//! Selector candidate extraction from content files

use regex::Regex;
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::options::RawContent;

/// Pattern used when no extractor is configured for a content source
pub const DEFAULT_EXTRACTOR_PATTERN: &str = r"[A-Za-z0-9_-]+";

static DEFAULT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_EXTRACTOR_PATTERN).expect("default extractor pattern is valid")
});

type ExtractorFn = dyn Fn(&str) -> Vec<String> + Send + Sync;

/// Turns the text of a content file into candidate selector tokens
#[derive(Clone)]
pub enum Extractor {
    /// Every match of the pattern is a candidate
    Pattern(Regex),
    /// Custom extraction function
    Function(Arc<ExtractorFn>),
}

impl Extractor {
    /// Build an extractor from a regex pattern
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    /// Build an extractor from a function
    ///
    /// # Example
    ///
    /// ```rust
    /// use fob_purgecss::Extractor;
    ///
    /// let extractor = Extractor::function(|content| {
    ///     content.split_whitespace().map(str::to_string).collect()
    /// });
    /// assert_eq!(extractor.extract("a b"), vec!["a", "b"]);
    /// ```
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }

    /// Run the extractor over `content`
    pub fn extract(&self, content: &str) -> Vec<String> {
        match self {
            Self::Pattern(regex) => regex
                .find_iter(content)
                .map(|m| m.as_str().to_string())
                .collect(),
            Self::Function(f) => f(content),
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::Pattern(DEFAULT_PATTERN.clone())
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// An extractor used for content sources with one of the given extensions
#[derive(Debug, Clone)]
pub struct ExtractorBinding {
    /// Extensions with or without the leading dot (`html`, `.vue`)
    pub extensions: Vec<String>,
    pub extractor: Extractor,
}

impl ExtractorBinding {
    pub fn new<I, S>(extensions: I, extractor: Extractor) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            extractor,
        }
    }

    fn matches(&self, extension: &str) -> bool {
        let extension = normalize_extension(extension);
        self.extensions
            .iter()
            .any(|ext| normalize_extension(ext).eq_ignore_ascii_case(extension))
    }
}

fn normalize_extension(extension: &str) -> &str {
    extension.trim_start_matches('.')
}

/// Collect the candidate set for all content sources
///
/// The first binding matching a source's extension wins. Sources without a
/// binding use `default_extractor`, or [`DEFAULT_EXTRACTOR_PATTERN`].
pub fn extract_candidates(
    content: &[RawContent],
    default_extractor: Option<&Extractor>,
    bindings: &[ExtractorBinding],
) -> FxHashSet<String> {
    let fallback = Extractor::default();
    let default_extractor = default_extractor.unwrap_or(&fallback);

    let mut candidates = FxHashSet::default();
    for source in content {
        let extractor = bindings
            .iter()
            .find(|binding| binding.matches(&source.extension))
            .map(|binding| &binding.extractor)
            .unwrap_or(default_extractor);

        let before = candidates.len();
        candidates.extend(extractor.extract(&source.raw));
        tracing::trace!(
            "[fob-purgecss] {} new candidates from .{} content",
            candidates.len() - before,
            normalize_extension(&source.extension)
        );
    }
    candidates
}
