//! Tool system for the agent loop
//!
//! Tools provide clock, filesystem, shell and HTTP access to the model. Each
//! run gets a `ToolContext` scoped to the project root - filesystem tools
//! cannot escape it, and every tool honours the run's deadline and
//! cancellation.

pub mod args;
mod context;
mod error;
mod executor;
pub mod output;
mod traits;

pub mod builtin;

pub use context::ToolContext;
pub use error::ToolError;
pub use executor::{ToolExecutor, ToolSettings};
pub use traits::{Tool, ToolResult};
