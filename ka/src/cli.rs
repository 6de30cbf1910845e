//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// kutagent - tool-calling chat agent
#[derive(Parser)]
#[command(
    name = "ka",
    about = "Chat with a local Ollama model that can use sandboxed tools",
    version,
    after_help = "Logs are written to: ~/.local/share/kutagent/logs/kutagent.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Sandbox root for filesystem and shell tools
    #[arg(short, long, global = true, help = "Project root the tools are confined to")]
    pub root: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start an interactive session (default)
    Repl,

    /// Ask one question and print the answer
    Ask {
        /// The prompt; multiple words are joined with spaces
        #[arg(required = true, num_args = 1.., value_name = "PROMPT")]
        prompt: Vec<String>,
    },

    /// Print the tool catalog sent to the model
    Tools,
}

/// Location of the log file
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("kutagent")
        .join("logs")
        .join("kutagent.log")
}
