//! LLM module for kutagent
//!
//! Message model, conversation history and the provider client.

pub mod client;
mod conversation;
mod error;
mod ollama;
mod types;

pub use client::LlmClient;
pub use conversation::Conversation;
pub use error::LlmError;
pub use ollama::OllamaClient;
pub use types::{
    AgentMessage, FunctionCall, FunctionDefinition, Message, ProviderRequest, ProviderResponse, Role, ToolArgs,
    ToolCall, ToolDefinition,
};
