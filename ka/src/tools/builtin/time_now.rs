//! time_now tool - report the current local time

use async_trait::async_trait;
use chrono::{Local, SecondsFormat};
use serde_json::Value;
use tracing::debug;

use crate::llm::ToolArgs;
use crate::tools::{Tool, ToolContext, ToolError};

/// Report the current local time in RFC 3339
pub struct TimeNowTool;

#[async_trait]
impl Tool for TimeNowTool {
    fn name(&self) -> &'static str {
        "time_now"
    }

    fn description(&self) -> &'static str {
        "Get the current local date and time in RFC 3339 format."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        })
    }

    async fn execute(&self, _args: &ToolArgs, _ctx: &ToolContext) -> Result<String, ToolError> {
        let now = Local::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        debug!(%now, "TimeNowTool::execute: called");
        Ok(now)
    }
}
