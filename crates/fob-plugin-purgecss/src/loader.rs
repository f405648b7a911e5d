//! The loader: stylesheet text in, purged stylesheet text out
//!
//! A purge runs in two phases. [`PurgeLoader::prepare`] is synchronous and
//! does every check that can fail because of user input: options, content
//! paths, reading files. Only when all of that succeeded does it hand back a
//! [`PurgeTask`], whose [`PurgeTask::run`] future performs the actual purge.
//!
//! ```text
//! raw css ─┐
//!          ├─ prepare (sync) ─→ PurgeTask ─ run (async) ─→ purged css
//! content ─┘      │
//!                 └─→ DependencyTracker (one call per content file)
//! ```

use fob_purgecss::{PurgeCss, PurgeOptions, RawContent, RawCss};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::content::resolve_content;
use crate::deps::DependencyTracker;
use crate::error::{PurgeLoaderError, Result};
use crate::options::PurgeLoaderOptions;

/// Host-neutral PurgeCSS loader
#[derive(Debug, Clone)]
pub struct PurgeLoader {
    options: PurgeLoaderOptions,
    /// Directory relative content paths are resolved against
    cwd: PathBuf,
    engine: PurgeCss,
}

impl PurgeLoader {
    /// Create a loader resolving content paths against the process working directory
    pub fn new(options: PurgeLoaderOptions) -> Self {
        Self {
            options,
            cwd: working_dir(std::env::current_dir()),
            engine: PurgeCss::new(),
        }
    }

    /// Resolve content paths against `cwd` instead
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn options(&self) -> &PurgeLoaderOptions {
        &self.options
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Validate options and load content files
    ///
    /// Each content file is registered with `tracker` after it is found to
    /// exist and before it is read. Any error aborts the whole invocation.
    pub fn prepare(&self, raw_css: &str, tracker: &dyn DependencyTracker) -> Result<PurgeTask> {
        self.options.validate()?;

        let content: Vec<RawContent> = resolve_content(&self.cwd, &self.options.content, tracker)?
            .into_iter()
            .map(RawContent::from)
            .collect();

        debug!(
            "[fob-purgecss] Prepared purge of {} bytes against {} content files",
            raw_css.len(),
            content.len()
        );

        Ok(PurgeTask {
            engine: self.engine,
            request: self
                .options
                .to_purge_options(content, RawCss::new(raw_css)),
        })
    }

    /// Prepare and run in one go
    pub async fn load(&self, raw_css: &str, tracker: &dyn DependencyTracker) -> Result<String> {
        self.prepare(raw_css, tracker)?.run().await
    }
}

/// The process working directory, or `.` with a warning when it cannot be read
fn working_dir(current: std::io::Result<PathBuf>) -> PathBuf {
    current.unwrap_or_else(|err| {
        warn!(
            "[fob-purgecss] Cannot read the working directory ({}), resolving content against \".\"",
            err
        );
        PathBuf::from(".")
    })
}

/// A validated purge request waiting to run
#[derive(Debug, Clone)]
pub struct PurgeTask {
    engine: PurgeCss,
    request: PurgeOptions,
}

impl PurgeTask {
    /// The request that will be sent to the engine
    pub fn request(&self) -> &PurgeOptions {
        &self.request
    }

    /// Purge the stylesheet and return its new text
    pub async fn run(self) -> Result<String> {
        let results = self.engine.purge(self.request).await?;

        // One stylesheet was submitted, so only the first result matters
        let result = results
            .into_iter()
            .next()
            .ok_or(PurgeLoaderError::NoResult)?;

        if let Some(rejected) = &result.rejected {
            debug!(
                "[fob-purgecss] Rejected {} selectors: {}",
                rejected.len(),
                rejected.join(", ")
            );
        }

        Ok(result.css)
    }
}
