//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{ToolContext, ToolError};
use crate::llm::ToolArgs;

/// A tool that can be called by the model
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the function name in tool calls)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool
    ///
    /// Errors are soft: the executor turns them into a `tool error:` result.
    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<String, ToolError>;
}

/// Result of a tool execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(content: impl Into<String>) -> Self {
        debug!("ToolResult::success: called");
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an error result
    pub fn error(content: impl Into<String>) -> Self {
        debug!("ToolResult::error: called");
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

impl From<Result<String, ToolError>> for ToolResult {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(content) => ToolResult::success(content),
            Err(e) => ToolResult::error(format!("tool error: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("wrote 5 bytes to a.txt");
        assert!(!result.is_error);
        assert_eq!(result.content, "wrote 5 bytes to a.txt");
    }

    #[test]
    fn test_tool_result_from_error() {
        let result = ToolResult::from(Err(ToolError::MissingArgument("path")));
        assert!(result.is_error);
        assert_eq!(result.content, "tool error: missing required argument: path");
    }
}
