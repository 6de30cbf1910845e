//! ToolExecutor - owns the tool catalog and dispatches calls

use std::time::Duration;
use tracing::{debug, info};

use crate::llm::{ToolCall, ToolDefinition};

use super::builtin::{
    DEFAULT_FETCH_TIMEOUT, DEFAULT_SHELL_TIMEOUT, EditFileTool, FetchUrlTool, ListFilesTool, ReadFileTool,
    RunShellTool, TimeNowTool,
};
use super::{Tool, ToolContext, ToolError, ToolResult};

/// Per-tool defaults that come from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSettings {
    pub shell_timeout: Duration,
    pub fetch_timeout: Duration,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            shell_timeout: DEFAULT_SHELL_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl ToolSettings {
    /// Settings from configured seconds; zero keeps the tool default
    pub fn from_secs(shell_secs: u64, fetch_secs: u64) -> Self {
        let or_default = |secs: u64, default: Duration| match secs {
            0 => default,
            secs => Duration::from_secs(secs),
        };
        Self {
            shell_timeout: or_default(shell_secs, DEFAULT_SHELL_TIMEOUT),
            fetch_timeout: or_default(fetch_secs, DEFAULT_FETCH_TIMEOUT),
        }
    }
}

/// Ordered tool catalog plus dispatch by name
pub struct ToolExecutor {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolExecutor {
    /// Create executor with the standard tools and default settings
    pub fn standard() -> Self {
        Self::with_settings(ToolSettings::default())
    }

    /// Create executor with the standard tools
    ///
    /// Catalog order is fixed: time_now, read_file, list_files, edit_file,
    /// run_shell, fetch_url.
    pub fn with_settings(settings: ToolSettings) -> Self {
        debug!(?settings, "ToolExecutor::with_settings: called");
        let mut executor = Self::empty();
        executor.add_tool(Box::new(TimeNowTool));
        executor.add_tool(Box::new(ReadFileTool));
        executor.add_tool(Box::new(ListFilesTool));
        executor.add_tool(Box::new(EditFileTool));
        executor.add_tool(Box::new(RunShellTool::new(settings.shell_timeout)));
        executor.add_tool(Box::new(FetchUrlTool::new(settings.fetch_timeout)));
        executor
    }

    /// Create an empty executor (for testing)
    pub fn empty() -> Self {
        debug!("ToolExecutor::empty: called");
        Self { tools: Vec::new() }
    }

    /// Add a tool, replacing any tool with the same name in place
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        debug!(tool_name = %tool.name(), "ToolExecutor::add_tool: called");
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Tool definitions sent with every provider request, in catalog order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        debug!(count = self.tools.len(), "ToolExecutor::definitions: called");
        self.tools
            .iter()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect()
    }

    /// Execute a tool call
    ///
    /// Never fails: errors come back as a `tool error:` result.
    pub async fn execute(&self, tool_call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        let name = tool_call.name();
        info!(tool_name = %name, tool_id = %tool_call.id, "ToolExecutor::execute: called");

        let result = match self.get(name) {
            Some(tool) => tool.execute(tool_call.arguments(), ctx).await,
            None => {
                debug!("ToolExecutor::execute: unknown tool");
                Err(ToolError::UnknownTool(name.to_string()))
            }
        };

        if let Err(e) = &result {
            debug!(tool_name = %name, error = %e, "ToolExecutor::execute: tool failed");
        }
        ToolResult::from(result)
    }

    fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }
}
