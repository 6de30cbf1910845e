//! Tool error types

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during tool execution
///
/// These are soft failures: the executor renders them as `tool error: ...`
/// text and the model gets a chance to correct itself.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid argument: {name} must be a {expected}")]
    InvalidArgument { name: &'static str, expected: &'static str },

    #[error("access outside project root is not allowed: {}", path.display())]
    SandboxViolation { path: PathBuf },

    #[error("stat file: {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path is a directory: {}", path.display())]
    IsDirectory { path: PathBuf },

    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("file too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("content too large: {size} bytes (limit {limit})")]
    ContentTooLarge { size: usize, limit: usize },

    #[error("{op}: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("walk dir: {0}")]
    Walk(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolError {
    /// Wrap an I/O error with the operation that failed
    pub fn io(op: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| ToolError::Io { op, source }
    }
}
