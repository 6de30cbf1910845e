//! edit_file tool - create or overwrite a file inside the project root

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::llm::ToolArgs;
use crate::tools::args::{present_str, required_str};
use crate::tools::output::MAX_OUTPUT_BYTES;
use crate::tools::{Tool, ToolContext, ToolError};

/// Write full file contents, creating parent directories as needed
pub struct EditFileTool;

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &'static str {
        "edit_file"
    }

    fn description(&self) -> &'static str {
        "Create or overwrite a file inside the project root with the given content. Missing parent directories are created."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path, relative to the project root; absolute paths must already lie inside it"
                },
                "content": {
                    "type": "string",
                    "description": "Complete new file content (max 1 MiB)"
                }
            },
            "required": ["path", "content"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<String, ToolError> {
        let path = required_str(args, "path")?;
        let content = present_str(args, "content")?;
        debug!(%path, content_len = content.len(), "EditFileTool::execute: called");

        if content.len() > MAX_OUTPUT_BYTES {
            debug!("EditFileTool::execute: content too large");
            return Err(ToolError::ContentTooLarge {
                size: content.len(),
                limit: MAX_OUTPUT_BYTES,
            });
        }

        let full_path = ctx.validate_path(path)?;

        if tokio::fs::metadata(&full_path).await.is_ok_and(|m| m.is_dir()) {
            debug!("EditFileTool::execute: target is a directory");
            return Err(ToolError::IsDirectory { path: full_path });
        }

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ToolError::io("create parent directories"))?;
        }

        tokio::fs::write(&full_path, content)
            .await
            .map_err(ToolError::io("write file"))?;

        debug!(?full_path, "EditFileTool::execute: wrote file");
        Ok(format!("wrote {} bytes to {}", content.len(), full_path.display()))
    }
}
