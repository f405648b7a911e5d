//! Rolldown plugin that removes unused CSS
//!
//! Each `.css` module passing through the bundler is purged against the
//! content files named in the options (HTML, Twig, Handlebars, ...). Rules
//! whose selectors never appear in any content file are dropped.
//!
//! ## Architecture
//!
//! ```text
//! .css module → transform() ─ prepare (sync): validate options,
//!                            │   resolve + watch + read content files
//!                            └ run (async): fob-purgecss → purged CSS
//! ```
//!
//! Anything wrong with the options or the content files fails the transform
//! before the purge starts. What happens when the purge itself fails is
//! controlled by [`EngineFailurePolicy`].
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fob_plugin_purgecss::{FobPurgeCssPlugin, PurgeLoaderOptions};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = PurgeLoaderOptions::from_json(
//!     r#"{ "content": ["index.html"], "whitelist": ["active"] }"#,
//! )?;
//! let plugin = Arc::new(FobPurgeCssPlugin::new(options));
//! // Add to your Rolldown bundler configuration
//! # Ok(())
//! # }
//! ```

use rolldown_common::LogWithoutPlugin;
use rolldown_plugin::{
    HookTransformArgs, HookTransformOutput, HookTransformReturn, HookUsage, Plugin,
    SharedTransformPluginContext,
};
use std::borrow::Cow;
use std::path::PathBuf;
use tracing::{debug, error};

mod content;
mod deps;
mod error;
mod loader;
mod options;

#[cfg(feature = "logging")]
pub mod logging;

pub use content::{ContentSource, file_extension, load_content_file, resolve_content, resolve_path};
pub use deps::{DependencyTracker, RecordingTracker};
pub use error::{PurgeLoaderError, Result};
pub use fob_purgecss::{Extractor, ExtractorBinding};
pub use loader::{PurgeLoader, PurgeTask};
pub use options::{PurgeLoaderOptions, schema};

/// What the plugin does when the purge engine itself fails
///
/// Option and content-file problems always fail the transform; this only
/// covers errors raised while purging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineFailurePolicy {
    /// Log the failure and leave the stylesheet untransformed
    #[default]
    Log,
    /// Fail the transform
    Propagate,
}

/// Rolldown plugin running the PurgeCSS loader on CSS modules
#[derive(Debug, Clone)]
pub struct FobPurgeCssPlugin {
    loader: PurgeLoader,
    /// Only ids containing one of these are purged (all when empty)
    include: Vec<String>,
    /// Ids containing one of these are never purged
    exclude: Vec<String>,
    on_engine_failure: EngineFailurePolicy,
}

impl FobPurgeCssPlugin {
    /// Create a plugin resolving content paths against the process working directory
    ///
    /// # Example
    ///
    /// ```rust
    /// use fob_plugin_purgecss::{FobPurgeCssPlugin, PurgeLoaderOptions};
    ///
    /// let plugin = FobPurgeCssPlugin::new(PurgeLoaderOptions::new(["index.html"]))
    ///     .with_cwd("/srv/site")
    ///     .exclude("vendor/");
    /// ```
    pub fn new(options: PurgeLoaderOptions) -> Self {
        Self::from_loader(PurgeLoader::new(options))
    }

    pub fn from_loader(loader: PurgeLoader) -> Self {
        Self {
            loader,
            include: Vec::new(),
            exclude: Vec::new(),
            on_engine_failure: EngineFailurePolicy::default(),
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.loader = self.loader.with_cwd(cwd);
        self
    }

    /// Only purge module ids containing `pattern`
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    /// Never purge module ids containing `pattern`
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn with_engine_failure(mut self, policy: EngineFailurePolicy) -> Self {
        self.on_engine_failure = policy;
        self
    }

    pub fn loader(&self) -> &PurgeLoader {
        &self.loader
    }

    /// Is `id` a stylesheet this plugin should purge?
    fn should_process(&self, id: &str) -> bool {
        if !id.ends_with(".css") {
            return false;
        }

        if self.exclude.iter().any(|pattern| id.contains(pattern.as_str())) {
            return false;
        }

        self.include.is_empty()
            || self
                .include
                .iter()
                .any(|pattern| id.contains(pattern.as_str()))
    }
}

impl Plugin for FobPurgeCssPlugin {
    fn name(&self) -> Cow<'static, str> {
        "fob-purgecss".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::Transform
    }

    /// Purge a CSS module
    ///
    /// Preparation runs before the future is created, so option and
    /// content-file errors are already settled when the hook returns.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(output))` - Purged CSS
    /// - `Ok(None)` - Not handled, or the purge failed under [`EngineFailurePolicy::Log`]
    /// - `Err(e)` - Invalid options, bad content file, or a propagated purge failure
    fn transform(
        &self,
        ctx: SharedTransformPluginContext,
        args: &HookTransformArgs<'_>,
    ) -> impl std::future::Future<Output = HookTransformReturn> + Send {
        let id = args.id.to_string();
        let code = args.code.to_string();
        let prepared = self
            .should_process(&id)
            .then(|| self.loader.prepare(&code, &*ctx));
        let policy = self.on_engine_failure;

        async move {
            let Some(prepared) = prepared else {
                return Ok(None);
            };
            let outcome = match prepared {
                Ok(task) => task.run().await,
                Err(err) => Err(err),
            };
            relay(&id, outcome, policy, |log| {
                ctx.warn(log);
            })
        }
    }
}

/// Turn the loader outcome for `id` into the hook's return value
///
/// Setup errors always fail the transform. Purge errors follow `policy`;
/// under [`EngineFailurePolicy::Log`] the warning is handed to `warn`.
fn relay(
    id: &str,
    outcome: Result<String>,
    policy: EngineFailurePolicy,
    warn: impl FnOnce(LogWithoutPlugin),
) -> HookTransformReturn {
    let err = match outcome {
        Ok(css) => {
            debug!("[fob-purgecss] Purged {} ({} bytes)", id, css.len());
            return Ok(Some(HookTransformOutput {
                code: Some(css),
                map: None,
                side_effects: None,
                module_type: None,
            }));
        }
        Err(err) => err,
    };

    if err.is_setup_error() {
        return Err(
            anyhow::Error::new(err).context(format!("Failed to prepare PurgeCSS for {}", id))
        );
    }

    match policy {
        EngineFailurePolicy::Propagate => {
            Err(anyhow::Error::new(err).context(format!("PurgeCSS failed for {}", id)))
        }
        EngineFailurePolicy::Log => {
            error!("[fob-purgecss] Purge failed for {} with err: {}", id, err);
            warn(LogWithoutPlugin {
                message: format!("PurgeCSS failed for {}, stylesheet left unpurged: {}", id, err),
                ..Default::default()
            });
            Ok(None)
        }
    }
}
