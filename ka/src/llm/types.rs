//! Chat request/response types for kutagent
//!
//! These types model the Ollama `/api/chat` wire format. The same `Message`
//! type is used for conversation history and for the request body, so a
//! request is a plain projection of the history plus the tool catalog.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::Conversation;

/// Loosely-typed tool arguments, as emitted by the model
pub type ToolArgs = Map<String, Value>;

/// Message role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[default]
    Assistant,
    Tool,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    /// Text body; empty for assistant turns that only carry tool calls
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,

    /// Calls requested by the model (assistant turns only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// Id of the call this message answers (tool turns only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Name of the tool that produced this result (tool turns only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        debug!("Message::user: called");
        Self {
            role: Role::User,
            content: text.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    /// Create an assistant message with text content only
    pub fn assistant(text: impl Into<String>) -> Self {
        debug!("Message::assistant: called");
        Self::assistant_with_calls(text, Vec::new())
    }

    /// Create an assistant message that records the tool calls it requested
    pub fn assistant_with_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        debug!(call_count = tool_calls.len(), "Message::assistant_with_calls: called");
        Self {
            role: Role::Assistant,
            content: text.into(),
            tool_calls,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a tool-result message answering `call_id`
    pub fn tool_result(call_id: impl Into<String>, tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        let call_id = call_id.into();
        debug!(%call_id, "Message::tool_result: called");
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id),
            name: Some(tool_name.into()),
        }
    }

    /// Whether this assistant message requested any tools
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Whether this message issued a call with the given id
    pub fn issued_call(&self, call_id: &str) -> bool {
        self.role == Role::Assistant && self.tool_calls.iter().any(|c| c.id == call_id)
    }
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id; may be absent on the wire, filled in before execution
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,

    pub function: FunctionCall,
}

/// Name and arguments of a requested call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,

    #[serde(default, deserialize_with = "deserialize_arguments")]
    pub arguments: ToolArgs,
}

impl ToolCall {
    /// Create a tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: ToolArgs) -> Self {
        Self {
            id: id.into(),
            kind: function_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }

    /// Tool name
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Tool arguments
    pub fn arguments(&self) -> &ToolArgs {
        &self.function.arguments
    }
}

fn function_kind() -> String {
    "function".to_string()
}

/// Accept arguments as a JSON object or as a JSON-encoded string
///
/// Ollama sends an object; OpenAI-compatible servers send a string.
fn deserialize_arguments<'de, D>(deserializer: D) -> Result<ToolArgs, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(ToolArgs::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(ToolArgs::new()),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(D::Error::custom(format!("tool arguments must be an object, got {}", other))),
            Err(e) => Err(D::Error::custom(format!("tool arguments are not valid JSON: {}", e))),
        },
        Some(other) => Err(D::Error::custom(format!("tool arguments must be an object, got {}", other))),
    }
}

/// Tool schema advertised to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,

    pub function: FunctionDefinition,
}

/// Function part of a tool schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new function tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        let name = name.into();
        debug!(%name, "ToolDefinition::new: called");
        Self {
            kind: function_kind(),
            function: FunctionDefinition {
                name,
                description: description.into(),
                parameters,
            },
        }
    }

    /// Tool name
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Body of one `/api/chat` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRequest {
    pub model: String,

    pub messages: Vec<Message>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    pub stream: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl ProviderRequest {
    /// Build a request from the current history and the tool catalog
    pub fn new(model: impl Into<String>, conversation: &Conversation, tools: &[ToolDefinition]) -> Self {
        debug!(messages = conversation.len(), tools = tools.len(), "ProviderRequest::new: called");
        Self {
            model: model.into(),
            messages: conversation.messages().to_vec(),
            tools: tools.to_vec(),
            stream: false,
            options: None,
        }
    }

    /// Attach provider options (temperature, num_ctx, ...)
    pub fn with_options(mut self, options: Option<Value>) -> Self {
        self.options = options;
        self
    }
}

/// Reply from one `/api/chat` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub created_at: String,

    pub message: AgentMessage,

    #[serde(default)]
    pub done: bool,

    #[serde(default)]
    pub done_reason: Option<String>,
}

/// The assistant turn inside a provider reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    #[serde(default)]
    pub role: Role,

    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub content: String,

    #[serde(default, deserialize_with = "deserialize_nullable_calls")]
    pub tool_calls: Vec<ToolCall>,
}

fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_nullable_calls<'de, D>(deserializer: D) -> Result<Vec<ToolCall>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ToolCall>>::deserialize(deserializer)?.unwrap_or_default())
}
