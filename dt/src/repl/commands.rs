//! Slash command parsing

use tracing::debug;

use crate::session::Panel;

/// A parsed `/command`
#[derive(Debug, Clone, PartialEq)]
pub enum SlashCommand {
    Help,
    Quit,
    Clear,
    /// `/temp` alone shows the value; with an argument sets it
    Temperature(Option<String>),
    Toggle(Panel),
    History,
    Unknown(String),
}

impl SlashCommand {
    /// Parse a line starting with `/`
    pub fn parse(input: &str) -> Self {
        debug!(%input, "SlashCommand::parse: called");
        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let arg = parts.next().map(str::to_string);

        match cmd {
            "/help" | "/h" => Self::Help,
            "/quit" | "/q" | "/exit" => Self::Quit,
            "/clear" | "/c" => Self::Clear,
            "/temp" | "/temperature" | "/t" => Self::Temperature(arg),
            "/settings" | "/s" => Self::Toggle(Panel::Settings),
            "/developer" | "/dev" => Self::Toggle(Panel::Developer),
            "/model" | "/m" => Self::Toggle(Panel::Model),
            "/history" => Self::History,
            other => Self::Unknown(other.to_string()),
        }
    }
}
