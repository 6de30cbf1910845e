//! LlmClient trait definition

use async_trait::async_trait;

use super::{LlmError, ProviderRequest, ProviderResponse};

/// Single-shot chat provider
///
/// One call is one request/response exchange. The client holds no
/// conversation state; the full history travels in every request.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one chat request and wait for the complete reply
    async fn chat(&self, request: ProviderRequest) -> Result<ProviderResponse, LlmError>;
}
