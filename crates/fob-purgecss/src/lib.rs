//! Remove unused CSS with lightningcss
//!
//! This crate takes stylesheets and a set of content files (HTML, templates,
//! components), extracts every token from the content that could be a
//! selector name, and drops the CSS rules whose selectors never appear.
//!
//! ## Pipeline
//!
//! ```text
//! content files → extractors → candidate set
//!                                   ↓
//! stylesheet → lightningcss parse → drop unused rules → print → PurgeResult
//! ```
//!
//! Optional passes remove unused `@font-face`, `@keyframes` and custom
//! properties once the selector pass is done.
//!
//! ## Example Usage
//!
//! ```rust
//! use fob_purgecss::{PurgeCss, PurgeOptions, RawContent, RawCss};
//!
//! let options = PurgeOptions::new(
//!     vec![RawContent::new("html", r#"<div class="used"></div>"#)],
//!     vec![RawCss::new(".used { color: red } .unused { color: blue }")],
//! );
//!
//! let results = PurgeCss::new().purge_blocking(&options)?;
//! assert!(results[0].css.contains(".used"));
//! assert!(!results[0].css.contains(".unused"));
//! # Ok::<(), fob_purgecss::PurgeError>(())
//! ```

mod error;
mod extractor;
mod options;
mod purger;
pub mod selector;

pub use error::{PurgeError, Result};
pub use extractor::{DEFAULT_EXTRACTOR_PATTERN, Extractor, ExtractorBinding, extract_candidates};
pub use options::{PurgeOptions, PurgeResult, RawContent, RawCss};

/// The purge engine
///
/// Stateless; one value can serve any number of concurrent purges.
#[derive(Debug, Clone, Copy, Default)]
pub struct PurgeCss;

impl PurgeCss {
    pub fn new() -> Self {
        Self
    }

    /// Purge every stylesheet in `options`
    ///
    /// Parsing and rule removal are CPU-bound, so the work runs on tokio's
    /// blocking pool. Results come back in the order of `options.css`.
    pub async fn purge(&self, options: PurgeOptions) -> Result<Vec<PurgeResult>> {
        let engine = *self;
        tokio::task::spawn_blocking(move || engine.purge_blocking(&options))
            .await
            .map_err(|e| PurgeError::Task(e.to_string()))?
    }

    /// Synchronous version of [`PurgeCss::purge`]
    pub fn purge_blocking(&self, options: &PurgeOptions) -> Result<Vec<PurgeResult>> {
        let candidates = extract_candidates(
            &options.content,
            options.default_extractor.as_ref(),
            &options.extractors,
        );

        options
            .css
            .iter()
            .map(|css| purger::purge_stylesheet(css, &candidates, options))
            .collect()
    }
}
