//! Interactive chat loop

use std::io::{self, Write};

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tracing::debug;

use super::commands::SlashCommand;
use super::render::{self, PanelContext};
use crate::config::AboutConfig;
use crate::conversation::Role;
use crate::llm::{ModelInfo, StreamChunk};
use crate::session::{Panel, Session, TurnOutcome};

/// Terminal front-end for one [`Session`]
pub struct ChatRepl {
    session: Session,
    about: AboutConfig,
    stream: bool,
    /// Last successful model listing, for the model panel
    installed: Option<Vec<ModelInfo>>,
}

impl ChatRepl {
    pub fn new(session: Session, about: AboutConfig, stream: bool) -> Self {
        debug!(session = %session.id(), stream, "ChatRepl::new: called");
        Self {
            session,
            about,
            stream,
            installed: None,
        }
    }

    /// Run the REPL main loop until /quit or Ctrl+D
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        // Create readline editor for proper line editing
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => match classify(&line) {
                    Input::Blank => continue,
                    Input::Command(cmd) => {
                        let _ = rl.add_history_entry(cmd);
                        match self.handle_slash_command(cmd).await {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    }
                    Input::Message(text) => {
                        let _ = rl.add_history_entry(text.trim());
                        self.process_user_input(text).await;
                    }
                },
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

        println!("안녕히 가세요!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", render::TITLE.bright_cyan().bold());
        println!("모델: {}", self.session.settings().model_id());
        println!("{}", render::PLACEHOLDER.dimmed());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    async fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        match SlashCommand::parse(input) {
            SlashCommand::Help => {
                self.print_help();
            }
            SlashCommand::Quit => return SlashResult::Quit,
            SlashCommand::Clear => {
                self.session.clear();
                println!("{}", "대화 내역을 지웠습니다.".dimmed());
            }
            SlashCommand::Temperature(None) => {
                println!("Temperature: {:.1}", self.session.settings().temperature());
            }
            SlashCommand::Temperature(Some(value)) => match value.parse::<f32>() {
                Ok(v) => match self.session.set_temperature(v) {
                    Ok(()) => println!("{} {:.1}", "Temperature:".dimmed(), v),
                    Err(e) => println!("{} {}", "!".red(), e),
                },
                Err(_) => println!("{} Not a number: {}", "!".red(), value),
            },
            SlashCommand::Toggle(panel) => {
                if self.session.toggle_panel(panel) {
                    if panel == Panel::Model {
                        self.refresh_installed().await;
                    }
                    println!("{}", self.render_panel(panel));
                } else {
                    println!("{}", format!("[{} 숨김]", panel.title()).dimmed());
                }
            }
            SlashCommand::History => {
                println!("{}", render::render_transcript(self.session.store().all()));
                for panel in self.session.snapshot().panels {
                    println!();
                    println!("{}", self.render_panel(panel));
                }
            }
            SlashCommand::Unknown(cmd) => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
        SlashResult::Continue
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:16} Show this help", "/help".yellow());
        println!("  {:16} Exit", "/quit".yellow());
        println!("  {:16} Clear conversation history", "/clear".yellow());
        println!("  {:16} Show or set temperature", "/temp [0.0-1.0]".yellow());
        println!("  {:16} Toggle settings panel", "/settings".yellow());
        println!("  {:16} Toggle developer panel", "/developer".yellow());
        println!("  {:16} Toggle model panel", "/model".yellow());
        println!("  {:16} Show conversation and open panels", "/history".yellow());
        println!();
    }

    fn render_panel(&self, panel: Panel) -> String {
        let settings = self.session.settings();
        let ctx = PanelContext {
            temperature: settings.temperature(),
            model: settings.model_id(),
            about: &self.about,
            installed: self.installed.as_deref(),
        };
        render::render_panel(panel, &ctx)
    }

    async fn refresh_installed(&mut self) {
        match self.session.installed_models().await {
            Ok(models) => self.installed = Some(models),
            Err(e) => {
                debug!(error = %e, "refresh_installed: listing failed");
                self.installed = None;
            }
        }
    }

    /// Run one turn, printing the answer or the failure notice
    async fn process_user_input(&mut self, input: &str) {
        let outcome = if self.stream {
            self.submit_streaming(input).await
        } else {
            println!("{}", render::WAITING.dimmed());
            self.session.submit(input).await
        };

        match outcome {
            TurnOutcome::Ignored => {}
            TurnOutcome::Answered { turn, .. } => {
                if !self.stream {
                    println!("{}", render::render_turn(&turn));
                }
            }
            TurnOutcome::Failed(notice) => {
                println!("{}", render::render_notice(&notice));
            }
        }
        println!();
    }

    async fn submit_streaming(&mut self, input: &str) -> TurnOutcome {
        let (tx, mut rx) = mpsc::channel::<StreamChunk>(100);

        // Spawn task to receive and print chunks
        let print_handle = tokio::spawn(async move {
            let mut printer = StreamPrinter::new(io::stdout())?;
            while let Some(chunk) = rx.recv().await {
                match chunk {
                    StreamChunk::TextDelta(text) => printer.delta(&text)?,
                    StreamChunk::Done { .. } => {}
                }
            }
            printer.finish().map(|_| ())
        });

        let outcome = self.session.submit_streaming(input, tx).await;

        // Wait for print task to finish
        match print_handle.await {
            Ok(Err(e)) => debug!(error = %e, "submit_streaming: stdout write failed"),
            Err(e) => debug!(error = %e, "submit_streaming: print task failed"),
            Ok(Ok(())) => {}
        }
        outcome
    }
}

/// Writes streamed deltas behind the assistant label
///
/// The waiting indicator stays on the line until the first delta replaces it.
struct StreamPrinter<W: Write> {
    out: W,
    started: bool,
}

/// Carriage return plus ANSI erase-line
const CLEAR_LINE: &str = "\r\x1b[2K";

impl<W: Write> StreamPrinter<W> {
    fn new(mut out: W) -> io::Result<Self> {
        write!(out, "{}", render::WAITING.dimmed())?;
        out.flush()?;
        Ok(Self { out, started: false })
    }

    fn delta(&mut self, text: &str) -> io::Result<()> {
        if !self.started {
            write!(self.out, "{}{}: ", CLEAR_LINE, render::speaker(Role::Assistant))?;
            self.started = true;
        }
        write!(self.out, "{}", text)?;
        self.out.flush()
    }

    /// End the line; drops the indicator if nothing arrived
    fn finish(mut self) -> io::Result<W> {
        if self.started {
            writeln!(self.out)?;
        } else {
            write!(self.out, "{}", CLEAR_LINE)?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

/// What one line of input asks for
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Blank,
    /// Trimmed slash command
    Command(&'a str),
    /// Chat message, untrimmed so the transcript keeps it as typed
    Message(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Input::Blank
    } else if trimmed.starts_with('/') {
        Input::Command(trimmed)
    } else {
        Input::Message(line)
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
