//! Interactive REPL for Deeptok
//!
//! Terminal presentation of a chat session: labeled turns, slash commands
//! for settings and panels, and live output while the model answers.

mod chat;
pub mod commands;
pub mod render;

pub use chat::ChatRepl;

use eyre::Result;

use crate::config::Config;
use crate::llm::ClientFactory;
use crate::session::Session;

/// Run the interactive REPL
///
/// This is the main entry point for `dt` and `dt chat`.
pub async fn run_interactive(config: &Config, system_prompt: String, factory: ClientFactory) -> Result<()> {
    let session = Session::new(config.llm.clone(), system_prompt, factory)?;
    let mut repl = ChatRepl::new(session, config.about.clone(), config.llm.stream);
    repl.run().await
}
