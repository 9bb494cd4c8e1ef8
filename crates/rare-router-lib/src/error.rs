use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the rare router library.
pub type Result<T> = std::result::Result<T, Error>;

/// Which anchor of a request failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemSide {
    Current,
    Target,
}

impl fmt::Display for SystemSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SystemSide::Current => "current",
            SystemSide::Target => "target",
        };
        f.write_str(value)
    }
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when the current or target system of a request has no coordinates.
    #[error("could not resolve {side} system '{name}'{}", format_suggestions(.suggestions))]
    UnresolvedSystem {
        side: SystemSide,
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a rare goods catalog entry fails validation.
    #[error("invalid rare goods catalog: {message}")]
    CatalogValidation { message: String },

    /// Raised when two catalog entries share a name (case-insensitive).
    #[error("duplicate rare good name encountered: {name}")]
    DuplicateRare { name: String },

    /// Raised when the configuration file cannot be interpreted.
    #[error("invalid configuration in {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve a data directory for the system cache")]
    DataDirUnavailable,

    /// Raised when the system snapshot could not be written to disk.
    #[error("failed to persist system cache to {path}: {message}")]
    CachePersistence { path: PathBuf, message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// "Did you mean" tail for a not-found message, or an empty string.
pub fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
