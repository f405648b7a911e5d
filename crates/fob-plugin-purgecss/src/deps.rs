//! Build dependency registration
//!
//! Every content file the loader reads becomes a dependency of the stylesheet
//! being transformed, so watch mode re-runs the purge when a template changes.

use parking_lot::Mutex;
use rolldown_plugin::{PluginContext, TransformPluginContext};
use std::path::{Path, PathBuf};

/// Receives the absolute path of each content file read by the loader
pub trait DependencyTracker: Send + Sync {
    fn add_dependency(&self, path: &Path);
}

impl DependencyTracker for PluginContext {
    fn add_dependency(&self, path: &Path) {
        self.add_watch_file(&path.to_string_lossy());
    }
}

impl DependencyTracker for TransformPluginContext {
    fn add_dependency(&self, path: &Path) {
        let context: &PluginContext = self;
        context.add_dependency(path);
    }
}

/// Tracker that remembers dependencies in registration order
///
/// Useful for hosts other than rolldown, and for tests.
#[derive(Debug, Default)]
pub struct RecordingTracker {
    dependencies: Mutex<Vec<PathBuf>>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the registered paths
    pub fn dependencies(&self) -> Vec<PathBuf> {
        self.dependencies.lock().clone()
    }
}

impl DependencyTracker for RecordingTracker {
    fn add_dependency(&self, path: &Path) {
        self.dependencies.lock().push(path.to_path_buf());
    }
}
