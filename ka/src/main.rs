//! kutagent - tool-calling chat agent
//!
//! CLI entry point for the interactive session and one-shot questions.

use std::fs;

use clap::Parser;
use eyre::{Context, Result};
use tracing::info;

use kutagent::cli::{Cli, Command, get_log_path};
use kutagent::config::Config;
use kutagent::llm::{Conversation, Message};
use kutagent::r#loop::LoopEngine;
use kutagent::repl;
use kutagent::tools::ToolExecutor;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Setup tracing subscriber - write to log file, not stdout/stderr
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    // `tools` only needs the static catalog
    if cli.command == Some(Command::Tools) {
        return cmd_tools();
    }

    let config = Config::load(cli.config.as_ref())
        .context("Failed to load configuration")?
        .with_env_overrides();
    config.validate().context("Invalid configuration")?;

    info!(
        "kutagent loaded config: model={}, endpoint={}",
        config.llm.model, config.llm.endpoint
    );

    let root = config.resolve_root(cli.root.as_deref())?;
    let engine = LoopEngine::from_config(&config, &root)
        .with_context(|| format!("Failed to open project root {}", root.display()))?;

    match cli.command {
        Some(Command::Ask { prompt }) => cmd_ask(&engine, &prompt.join(" ")).await,
        Some(Command::Repl) | None => repl::run_interactive(engine).await,
        Some(Command::Tools) => cmd_tools(),
    }
}

/// Answer one prompt and print the result
async fn cmd_ask(engine: &LoopEngine, prompt: &str) -> Result<()> {
    let mut conversation = Conversation::new();
    conversation.push(Message::user(prompt));

    let answer = engine.run(&mut conversation).await.context("Agent run failed")?;
    println!("{}", answer.content);
    Ok(())
}

/// Print the tool catalog as JSON
fn cmd_tools() -> Result<()> {
    let definitions = ToolExecutor::standard().definitions();
    println!("{}", serde_json::to_string_pretty(&definitions)?);
    Ok(())
}
