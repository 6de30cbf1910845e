//! kutagent - tool-calling chat agent
//!
//! kutagent mediates between an operator, an Ollama-compatible chat
//! provider and a small set of sandboxed local tools. The provider may ask
//! for tool calls; the loop runs them, feeds the results back and repeats
//! until the model answers or the step bound is reached.
//!
//! # Core Concepts
//!
//! - **Bounded Runs**: every run has a step bound, a deadline and a cancellation token
//! - **Root Confinement**: filesystem and shell tools never leave the project root
//! - **Soft Tool Errors**: tool failures go back to the model as text, not as errors
//!
//! # Modules
//!
//! - [`llm`] - Message model, conversation and Ollama client
//! - [`tools`] - Tool catalog, sandbox and built-in tools
//! - [`r#loop`] - Orchestration loop
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//! - [`repl`] - Interactive session

pub mod cli;
pub mod config;
pub mod llm;
pub mod repl;
pub mod tools;

// Note: 'loop' is a reserved keyword, so we use r#loop
#[path = "loop/mod.rs"]
pub mod r#loop;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use llm::{Conversation, LlmClient, LlmError, Message, OllamaClient, Role, ToolCall};
pub use r#loop::{LoopConfig, LoopEngine, LoopError, RunOptions};
pub use tools::{Tool, ToolContext, ToolError, ToolExecutor, ToolResult};
