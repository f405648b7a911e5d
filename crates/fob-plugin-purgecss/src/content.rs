//! Content file resolution
//!
//! Turns the `content` option into the sources handed to the purge engine.
//! Entries are processed strictly in order and the first failure aborts the
//! whole list, so no purge ever runs on a partial set of files.

use fob_purgecss::RawContent;
use path_clean::PathClean;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use crate::deps::DependencyTracker;
use crate::error::{PurgeLoaderError, Result};

static EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[A-Za-z0-9_]+$").expect("extension pattern is valid"));

/// A resolved and loaded content file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSource {
    /// Absolute, normalized path
    pub path: PathBuf,
    /// Trailing `.<ext>` of the file name, dot included
    pub extension: String,
    /// Full UTF-8 text of the file
    pub raw: String,
}

impl From<ContentSource> for RawContent {
    fn from(source: ContentSource) -> Self {
        RawContent::new(source.extension, source.raw)
    }
}

/// Make `path` absolute against `cwd` and drop `.`/`..` components
pub fn resolve_path(cwd: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.clean()
    } else {
        cwd.join(path).clean()
    }
}

/// The `.<ext>` suffix of the file name
pub fn file_extension(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

    EXTENSION
        .find(&file_name)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| PurgeLoaderError::UndefinedExtension {
            path: path.to_path_buf(),
            reason: format!("no `.<extension>` suffix in file name \"{}\"", file_name),
        })
}

/// Existence follows symlinks; the regular-file check does not
fn validate_file_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PurgeLoaderError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let is_file = std::fs::symlink_metadata(path)
        .map(|metadata| metadata.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(PurgeLoaderError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// Resolve, validate, register and read one content file
pub fn load_content_file(
    cwd: &Path,
    entry: &str,
    tracker: &dyn DependencyTracker,
) -> Result<ContentSource> {
    let path = resolve_path(cwd, entry);
    validate_file_path(&path)?;

    tracker.add_dependency(&path);

    let extension = file_extension(&path)?;
    let raw = std::fs::read_to_string(&path).map_err(|source| PurgeLoaderError::Read {
        path: path.clone(),
        source,
    })?;

    debug!(
        "[fob-purgecss] Loaded content {} ({} bytes)",
        path.display(),
        raw.len()
    );

    Ok(ContentSource {
        path,
        extension,
        raw,
    })
}

/// Load every entry of `content`, in order
pub fn resolve_content(
    cwd: &Path,
    content: &[String],
    tracker: &dyn DependencyTracker,
) -> Result<Vec<ContentSource>> {
    content
        .iter()
        .map(|entry| load_content_file(cwd, entry, tracker))
        .collect()
}
