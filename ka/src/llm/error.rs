//! LLM error types

use thiserror::Error;

/// Errors that can occur talking to the chat provider
///
/// All of these are hard failures: they mean the channel to the provider is
/// broken, so the current run is aborted.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider error: status {status}, body: {body}")]
    ApiError { status: u16, body: String },

    #[error("request provider: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode response: {message}; body: {body}")]
    InvalidResponse { message: String, body: String },

    #[error("marshal request: {0}")]
    Json(#[from] serde_json::Error),
}
