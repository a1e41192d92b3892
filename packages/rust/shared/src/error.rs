//! Error types for planindex.
//!
//! Library crates use [`PlanIndexError`] via `thiserror`.
//! The CLI binary wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all planindex operations.
#[derive(Debug, thiserror::Error)]
pub enum PlanIndexError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport failure, request timeout, or non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// Response body is not valid JSON.
    #[error("decode error: {0}")]
    Decode(String),

    /// A required document field is absent or has the wrong shape.
    #[error("schema error at `{path}`: {message}")]
    Schema { path: String, message: String },

    /// A fetch/extract unit failed for a specific source URL.
    #[error("unit failed for {url}: {source}")]
    Unit {
        url: String,
        #[source]
        source: Box<PlanIndexError>,
    },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed input list, invalid artifact, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PlanIndexError>;

impl PlanIndexError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a schema error for a document path.
    pub fn schema(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attribute a per-unit failure to the source URL it came from.
    pub fn unit(url: impl Into<String>, source: PlanIndexError) -> Self {
        Self::Unit {
            url: url.into(),
            source: Box::new(source),
        }
    }
}
