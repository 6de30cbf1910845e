//! read_file tool - read a file inside the project root

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::llm::ToolArgs;
use crate::tools::args::required_str;
use crate::tools::output::MAX_OUTPUT_BYTES;
use crate::tools::{Tool, ToolContext, ToolError};

/// Read a file's contents as text
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Read a text file inside the project root. Files over 1 MiB are rejected."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path, relative to the project root; absolute paths must already lie inside it"
                }
            },
            "required": ["path"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<String, ToolError> {
        let path = required_str(args, "path")?;
        debug!(%path, "ReadFileTool::execute: called");

        let full_path = ctx.validate_path(path)?;

        let meta = tokio::fs::metadata(&full_path).await.map_err(|source| ToolError::Stat {
            path: full_path.clone(),
            source,
        })?;

        if meta.is_dir() {
            debug!("ReadFileTool::execute: target is a directory");
            return Err(ToolError::IsDirectory { path: full_path });
        }

        let limit = MAX_OUTPUT_BYTES as u64;
        if meta.len() > limit {
            debug!(size = meta.len(), "ReadFileTool::execute: file too large");
            return Err(ToolError::FileTooLarge { size: meta.len(), limit });
        }

        let bytes = tokio::fs::read(&full_path).await.map_err(ToolError::io("read file"))?;
        debug!(len = bytes.len(), "ReadFileTool::execute: read complete");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
