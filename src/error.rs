//! Error types for the component graph extractor.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the extractor.
///
/// Per-file problems (parse failures, ambiguous names) are normally turned
/// into [`Diagnostic`](crate::graph::Diagnostic) records instead of being
/// returned; only run-level conditions reach callers as `Err`.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported language for file: {}", .0.display())]
    UnsupportedLanguage(PathBuf),

    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("an extraction run is already in progress")]
    RunInProgress,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
