//! list_files tool - recursively list files under a directory

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::llm::ToolArgs;
use crate::tools::args::required_str;
use crate::tools::output::{MAX_OUTPUT_BYTES, TRUNCATION_NOTICE};
use crate::tools::{Tool, ToolContext, ToolError};

/// Maximum number of paths one listing returns
pub const MAX_LIST_ENTRIES: usize = 5000;

/// List every file below a directory
pub struct ListFilesTool;

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &'static str {
        "list_files"
    }

    fn description(&self) -> &'static str {
        "Recursively list files (not directories) under a directory inside the project root."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory path, relative to the project root (use \".\" for the root); absolute paths must already lie inside it"
                }
            },
            "required": ["path"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<String, ToolError> {
        let path = required_str(args, "path")?;
        debug!(%path, "ListFilesTool::execute: called");

        let dir = ctx.validate_path(path)?;

        let meta = tokio::fs::metadata(&dir).await.map_err(|source| ToolError::Stat {
            path: dir.clone(),
            source,
        })?;
        if !meta.is_dir() {
            debug!("ListFilesTool::execute: target is not a directory");
            return Err(ToolError::NotADirectory { path: dir });
        }

        let ctx = ctx.clone();
        tokio::task::spawn_blocking(move || walk(&dir, &ctx, MAX_LIST_ENTRIES, MAX_OUTPUT_BYTES))
            .await
            .map_err(|e| ToolError::Walk(e.to_string()))?
    }
}

/// Walk `dir` lazily, stopping at either cap
fn walk(dir: &Path, ctx: &ToolContext, max_entries: usize, max_bytes: usize) -> Result<String, ToolError> {
    debug!(?dir, max_entries, max_bytes, "walk: called");
    let mut out = String::new();
    let mut count = 0;
    let mut truncated = false;

    let walker = WalkDir::new(dir).follow_links(false).sort_by_file_name();

    for entry in walker {
        if ctx.cancellation().is_cancelled() {
            debug!("walk: cancelled");
            return Err(ToolError::Cancelled);
        }

        let entry = entry.map_err(|e| ToolError::Walk(e.to_string()))?;
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if !ctx.is_within_root(path) {
            warn!(?path, "walk: entry outside root, skipping");
            continue;
        }

        if count == max_entries {
            debug!(count, "walk: entry cap reached");
            truncated = true;
            break;
        }

        let line = path.to_string_lossy();
        let needed = if out.is_empty() { line.len() } else { line.len() + 1 };
        if out.len() + needed > max_bytes {
            debug!(len = out.len(), "walk: byte cap reached");
            truncated = true;
            break;
        }

        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&line);
        count += 1;
    }

    if truncated {
        out.push_str(TRUNCATION_NOTICE);
    }

    debug!(count, truncated, "walk: complete");
    Ok(out)
}
