//! Ollama chat client
//!
//! Implements the LlmClient trait for an Ollama-compatible `/api/chat`
//! endpoint: one non-streaming POST per call, no retries.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{LlmClient, LlmError, ProviderRequest, ProviderResponse};
use crate::config::LlmConfig;

/// Ollama chat client
///
/// The HTTP client carries no timeout of its own; callers bound each call with
/// their own deadline and dropping the future aborts the request.
pub struct OllamaClient {
    endpoint: String,
    model: String,
    options: Option<Value>,
    http: Client,
}

impl OllamaClient {
    /// Create a client for `endpoint` using `model` when a request names none
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let model = model.into();
        debug!(%endpoint, %model, "OllamaClient::new: called");
        Self {
            endpoint,
            model,
            options: None,
            http: Client::new(),
        }
    }

    /// Create a client from configuration
    pub fn from_config(config: &LlmConfig) -> Self {
        debug!(?config, "OllamaClient::from_config: called");
        Self::new(&config.endpoint, &config.model).with_options(config.options.clone())
    }

    /// Provider options applied to requests that carry none
    pub fn with_options(mut self, options: Option<Value>) -> Self {
        self.options = options;
        self
    }

    fn prepare(&self, mut request: ProviderRequest) -> ProviderRequest {
        if request.model.is_empty() {
            debug!(model = %self.model, "OllamaClient::prepare: using configured model");
            request.model = self.model.clone();
        }
        if request.options.is_none() {
            request.options = self.options.clone();
        }
        request.stream = false;
        request
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat(&self, request: ProviderRequest) -> Result<ProviderResponse, LlmError> {
        let request = self.prepare(request);
        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "OllamaClient::chat: called"
        );

        let body = serde_json::to_vec(&request)?;

        let response = self
            .http
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "OllamaClient::chat: API error");
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply: ProviderResponse = serde_json::from_str(&text).map_err(|e| {
            debug!(error = %e, "OllamaClient::chat: malformed body");
            LlmError::InvalidResponse {
                message: e.to_string(),
                body: text.clone(),
            }
        })?;

        debug!(
            done = reply.done,
            tool_calls = reply.message.tool_calls.len(),
            content_len = reply.message.content.len(),
            "OllamaClient::chat: success"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Conversation, Message, ToolDefinition};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(model: &str) -> ProviderRequest {
        let mut conv = Conversation::new();
        conv.push(Message::user("hello"));
        let tools = vec![ToolDefinition::new("time_now", "clock", json!({"type": "object"}))];
        ProviderRequest::new(model, &conv, &tools)
    }

    async fn server_replying(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_chat_decodes_text_reply() {
        let server = server_replying(ResponseTemplate::new(200).set_body_json(json!({
            "model": "qwen3-16k",
            "created_at": "2025-01-01T00:00:00Z",
            "message": {"role": "assistant", "content": "hi there"},
            "done": true,
            "done_reason": "stop"
        })))
        .await;

        let client = OllamaClient::new(format!("{}/api/chat", server.uri()), "qwen3-16k");
        let reply = client.chat(request("")).await.unwrap();

        assert_eq!(reply.message.content, "hi there");
        assert!(reply.done);
    }

    #[tokio::test]
    async fn test_chat_decodes_tool_calls() {
        let server = server_replying(ResponseTemplate::new(200).set_body_json(json!({
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [{"function": {"name": "read_file", "arguments": {"path": "a.txt"}}}]
            },
            "done": true
        })))
        .await;

        let client = OllamaClient::new(format!("{}/api/chat", server.uri()), "m");
        let reply = client.chat(request("")).await.unwrap();

        assert!(!reply.message.tool_calls.is_empty());
        assert_eq!(reply.message.tool_calls[0].name(), "read_file");
        assert_eq!(reply.message.tool_calls[0].arguments()["path"], "a.txt");
    }

    #[tokio::test]
    async fn test_chat_fills_in_configured_model_and_options() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "model": "configured",
                "stream": false,
                "options": {"temperature": 0},
                "tools": [{"type": "function", "function": {"name": "time_now"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "ok"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(format!("{}/api/chat", server.uri()), "configured")
            .with_options(Some(json!({"temperature": 0})));
        let reply = client.chat(request("")).await.unwrap();

        assert_eq!(reply.message.content, "ok");
    }

    #[tokio::test]
    async fn test_chat_keeps_request_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"model": "explicit"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "ok"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(format!("{}/api/chat", server.uri()), "configured");
        client.chat(request("explicit")).await.unwrap();
    }

    #[tokio::test]
    async fn test_chat_non_success_is_api_error() {
        let server = server_replying(ResponseTemplate::new(500).set_body_string("model not found")).await;

        let client = OllamaClient::new(format!("{}/api/chat", server.uri()), "m");
        let err = client.chat(request("")).await.unwrap_err();

        match err {
            LlmError::ApiError { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model not found");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_malformed_body_is_invalid_response() {
        let server = server_replying(ResponseTemplate::new(200).set_body_string("not json")).await;

        let client = OllamaClient::new(format!("{}/api/chat", server.uri()), "m");
        let err = client.chat(request("")).await.unwrap_err();

        match err {
            LlmError::InvalidResponse { body, .. } => assert_eq!(body, "not json"),
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_missing_message_is_invalid_response() {
        let server = server_replying(ResponseTemplate::new(200).set_body_json(json!({"done": true}))).await;

        let client = OllamaClient::new(format!("{}/api/chat", server.uri()), "m");
        let err = client.chat(request("")).await.unwrap_err();

        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_chat_unreachable_is_network_error() {
        let client = OllamaClient::new("http://127.0.0.1:1/api/chat", "m");
        let err = client.chat(request("")).await.unwrap_err();

        assert!(matches!(err, LlmError::Network(_)));
    }
}
