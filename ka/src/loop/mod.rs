//! Orchestration loop for kutagent
//!
//! A run sends the conversation and tool catalog to the provider, executes any
//! requested tool calls, folds their results back into the conversation and
//! repeats until the model answers or the step bound is reached.

mod config;
mod engine;

pub use config::LoopConfig;
pub use engine::{LoopEngine, LoopError, RunOptions};
