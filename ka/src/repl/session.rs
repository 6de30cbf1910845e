//! REPL session management

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::llm::{Conversation, Message, Role};
use crate::r#loop::{LoopEngine, RunOptions};

/// Longest tool output echoed to the terminal
const DISPLAY_LIMIT: usize = 2000;

/// Interactive REPL session
///
/// Owns one conversation for its whole lifetime; every prompt is resolved by
/// a run of the loop engine against that conversation.
pub struct ReplSession {
    engine: LoopEngine,
    conversation: Conversation,
}

impl ReplSession {
    /// Create a new REPL session
    pub fn new(engine: LoopEngine) -> Self {
        debug!("ReplSession::new: called");
        Self {
            engine,
            conversation: Conversation::new(),
        }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        // Create readline editor for proper line editing
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input) {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.process_user_input(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D - exit
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        let config = self.engine.config();
        println!();
        println!("{}", "kutagent".bright_cyan().bold());
        println!("Model: {}", config.model);
        println!("Project root: {}", self.engine.context().root().display());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let cmd = input.split_whitespace().next().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/clear" | "/c" => {
                self.conversation = Conversation::new();
                println!("{}", "Conversation cleared.".dimmed());
                SlashResult::Continue
            }
            "/history" => {
                self.print_history();
                SlashResult::Continue
            }
            "/tools" => {
                self.print_tools();
                SlashResult::Continue
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:14} Show this help", "/help".yellow());
        println!("  {:14} Exit the session", "/quit".yellow());
        println!("  {:14} Start a new conversation", "/clear".yellow());
        println!("  {:14} Show conversation history", "/history".yellow());
        println!("  {:14} List the tools the model can call", "/tools".yellow());
        println!();
        println!("Press Ctrl+C while the agent is working to cancel the current request.");
        println!();
    }

    fn print_tools(&self) {
        println!();
        println!("{}", "Available Tools:".bright_cyan());
        for def in self.engine.executor().definitions() {
            println!("  {:14} {}", def.name().yellow(), def.function.description);
        }
        println!();
    }

    /// Print conversation history
    fn print_history(&self) {
        if self.conversation.is_empty() {
            println!("{}", "No conversation history.".dimmed());
            return;
        }

        println!();
        println!("{}", "Conversation History:".bright_cyan());
        for (i, msg) in self.conversation.messages().iter().enumerate() {
            let role = match msg.role {
                Role::User => "User".bright_green(),
                Role::Assistant => "Assistant".bright_blue(),
                Role::Tool => "Tool".bright_yellow(),
            };
            let summary = if msg.has_tool_calls() {
                let names: Vec<_> = msg.tool_calls.iter().map(|c| c.name()).collect();
                format!("[calls {}]", names.join(", "))
            } else {
                preview(&msg.content, 50)
            };
            println!("  {}. {}: {}", i + 1, role, summary);
        }
        println!();
    }

    /// Resolve one prompt; hard errors are printed and the session goes on
    async fn process_user_input(&mut self, input: &str) {
        self.conversation.push(Message::user(input));
        let start = self.conversation.len();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                trigger.cancel();
            }
        });

        let result = self
            .engine
            .run_with(&mut self.conversation, RunOptions::default().with_cancel(cancel))
            .await;
        ctrl_c.abort();

        print_activity(&self.conversation.messages()[start..]);

        match result {
            Ok(answer) => {
                println!();
                if answer.content.is_empty() {
                    println!("{}", "(no answer)".dimmed());
                } else {
                    println!("{}", answer.content);
                }
            }
            Err(e) => {
                warn!(error = %e, "ReplSession::process_user_input: run failed");
                println!("{} {}", "Error:".red(), e);
            }
        }
        println!();
    }
}

/// Echo tool calls and their results appended by a run
fn print_activity(messages: &[Message]) {
    for msg in messages {
        match msg.role {
            Role::Assistant if msg.has_tool_calls() => {
                for call in &msg.tool_calls {
                    let args = serde_json::to_string(call.arguments()).unwrap_or_default();
                    println!();
                    println!("{} {} {}", "Tool:".bright_yellow(), call.name().bright_white(), args.dimmed());
                }
            }
            Role::Tool => {
                if msg.content.starts_with("tool error:") {
                    println!("{}", preview(&msg.content, DISPLAY_LIMIT).red());
                } else {
                    println!("{}", preview(&msg.content, DISPLAY_LIMIT).dimmed());
                }
            }
            _ => {}
        }
    }
}

/// First `max` characters of `text`, marking anything cut
fn preview(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    format!("{}... ({} chars total)", head, count)
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
