//! Error types for the PurgeCSS loader

use fob_purgecss::PurgeError;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PurgeLoaderError>;

/// Errors raised while validating options, resolving content files, or purging
///
/// Everything except [`PurgeLoaderError::Engine`] and
/// [`PurgeLoaderError::NoResult`] is raised before the purge starts.
#[derive(Error, Debug, Diagnostic)]
pub enum PurgeLoaderError {
    /// Options do not match the loader schema
    #[error("Invalid PurgeCSS loader options:\n{}", .errors.join("\n"))]
    #[diagnostic(
        code(fob::purgecss::invalid_options),
        help("Recognized options: content, defaultExtractor, extractors, whitelist, whitelistPatterns, whitelistPatternsChildren, fontFace, keyframes, variables, rejected")
    )]
    Schema { errors: Vec<String> },

    /// An option has the right shape but an unusable value
    #[error("Invalid value for option `{option}`: {message}")]
    #[diagnostic(code(fob::purgecss::invalid_option_value))]
    InvalidOption { option: String, message: String },

    /// An options file could not be loaded
    #[error("Failed to load PurgeCSS options from {}: {message}", .path.display())]
    #[diagnostic(
        code(fob::purgecss::config_file),
        help("Options files must be .json or .toml")
    )]
    ConfigFile { path: PathBuf, message: String },

    /// `content` is empty
    #[error("You must provide a content file to analyse for PurgeCSS")]
    #[diagnostic(
        code(fob::purgecss::empty_content),
        help("Add at least one HTML or template file to the `content` option")
    )]
    EmptyContent,

    /// A content path does not exist
    #[error("File in \"{}\" doesn't exist", .path.display())]
    #[diagnostic(code(fob::purgecss::content_not_found))]
    NotFound { path: PathBuf },

    /// A content path exists but is not a regular file
    #[error("\"{}\" is not a file", .path.display())]
    #[diagnostic(
        code(fob::purgecss::content_not_a_file),
        help("Content entries must name files, not directories")
    )]
    NotAFile { path: PathBuf },

    /// A content file name has no `.<ext>` suffix
    #[error("Undefined extension of \"{}\" with error: {reason}", .path.display())]
    #[diagnostic(code(fob::purgecss::undefined_extension))]
    UndefinedExtension { path: PathBuf, reason: String },

    /// A content file could not be read as UTF-8 text
    #[error("Impossible to read the content of \"{}\" with error: {source}", .path.display())]
    #[diagnostic(code(fob::purgecss::read_failed))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The purge engine failed
    #[error("Purge failed with error: {0}")]
    #[diagnostic(code(fob::purgecss::engine_failed))]
    Engine(#[from] PurgeError),

    /// The purge engine returned no result for the submitted stylesheet
    #[error("Purge engine returned no result for the stylesheet")]
    #[diagnostic(code(fob::purgecss::no_result))]
    NoResult,
}

impl PurgeLoaderError {
    pub fn invalid_option(option: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidOption {
            option: option.into(),
            message: message.to_string(),
        }
    }

    /// True for failures that happen before any purge work starts
    pub fn is_setup_error(&self) -> bool {
        !matches!(self, Self::Engine(_) | Self::NoResult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_errors_are_distinguishable() {
        let missing = PurgeLoaderError::NotFound {
            path: PathBuf::from("/site/missing.html"),
        };
        let dir = PurgeLoaderError::NotAFile {
            path: PathBuf::from("/site/templates"),
        };

        assert_eq!(missing.to_string(), "File in \"/site/missing.html\" doesn't exist");
        assert_eq!(dir.to_string(), "\"/site/templates\" is not a file");
    }

    #[test]
    fn test_schema_error_lists_every_problem() {
        let err = PurgeLoaderError::Schema {
            errors: vec!["first".into(), "second".into()],
        };
        assert_eq!(err.to_string(), "Invalid PurgeCSS loader options:\nfirst\nsecond");
    }

    #[test]
    fn test_setup_classification() {
        assert!(PurgeLoaderError::EmptyContent.is_setup_error());
        assert!(!PurgeLoaderError::NoResult.is_setup_error());
        assert!(!PurgeLoaderError::Engine(PurgeError::Task("cancelled".into())).is_setup_error());
    }
}
