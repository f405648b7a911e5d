//! Error types for the purge engine

use miette::Diagnostic;
use thiserror::Error;

fn origin(name: &Option<String>) -> String {
    name.as_deref()
        .map(|n| format!(" from {}", n))
        .unwrap_or_default()
}

/// Errors that can occur while purging a stylesheet
#[derive(Error, Debug, Diagnostic)]
pub enum PurgeError {
    /// lightningcss rejected the stylesheet
    #[error("Failed to parse CSS{}: {}", origin(.name), .message)]
    #[diagnostic(
        code(fob::purgecss::parse_error),
        help("Check the stylesheet for syntax errors")
    )]
    Parse {
        name: Option<String>,
        message: String,
    },

    /// The purged stylesheet could not be serialized
    #[error("Failed to print CSS{}: {}", origin(.name), .message)]
    #[diagnostic(code(fob::purgecss::print_error))]
    Print {
        name: Option<String>,
        message: String,
    },

    /// The blocking purge task panicked or was cancelled
    #[error("Purge task failed: {0}")]
    #[diagnostic(code(fob::purgecss::task_failed))]
    Task(String),
}

impl PurgeError {
    pub fn parse(name: Option<&str>, message: impl Into<String>) -> Self {
        Self::Parse {
            name: name.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn print(name: Option<&str>, message: impl Into<String>) -> Self {
        Self::Print {
            name: name.map(str::to_string),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PurgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_mentions_name() {
        let err = PurgeError::parse(Some("app.css"), "unexpected token");
        assert_eq!(
            err.to_string(),
            "Failed to parse CSS from app.css: unexpected token"
        );
    }

    #[test]
    fn test_parse_error_without_name() {
        let err = PurgeError::parse(None, "unexpected token");
        assert_eq!(err.to_string(), "Failed to parse CSS: unexpected token");
    }
}
