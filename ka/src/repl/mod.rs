//! Interactive REPL for kutagent
//!
//! Line-based console with readline editing, tool-call echo and slash
//! commands.

mod session;

pub use session::ReplSession;

use eyre::Result;

use crate::r#loop::LoopEngine;

/// Run the interactive REPL
///
/// This is the main entry point for `ka` and `ka repl`.
pub async fn run_interactive(engine: LoopEngine) -> Result<()> {
    let mut session = ReplSession::new(engine);
    session.run().await
}
