//! Deeptok - terminal chat with a locally hosted language model
//!
//! CLI entry point.

use std::fs;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use deeptok::cli::{Cli, Command, OutputFormat, get_log_path};
use deeptok::config::Config;
use deeptok::llm::{self, ClientFactory};
use deeptok::prompts::PromptLoader;
use deeptok::repl::{self, render};
use deeptok::session::{Session, TurnOutcome};
use deeptok::{TokenUsage, Turn};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    // Load configuration, then let flags win
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    info!(model = %config.llm.model, base_url = %config.llm.base_url, "Deeptok loaded config");

    let factory = llm::default_factory();

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Ask { text, format }) => {
            debug!(%format, "main: matched Ask command");
            cmd_ask(&config, factory, &text, format).await
        }
        Some(Command::Models) => {
            debug!("main: matched Models command");
            cmd_models(&config).await
        }
        Some(Command::Chat) | None => {
            debug!("main: launching REPL");
            let system_prompt = load_system_prompt(&config)?;
            repl::run_interactive(&config, system_prompt, factory).await
        }
    }
}

fn load_system_prompt(config: &Config) -> Result<String> {
    let project_dir = std::env::current_dir().context("Failed to read current directory")?;
    PromptLoader::new(config.chat.system_prompt_file.clone(), project_dir).system_prompt()
}

/// JSON shape printed by `dt ask --format json`
#[derive(Serialize)]
struct AskTranscript<'a> {
    model: &'a str,
    temperature: f32,
    turns: &'a [Turn],
    usage: Option<TokenUsage>,
}

/// Run one turn through a fresh session
async fn cmd_ask(config: &Config, factory: ClientFactory, text: &str, format: OutputFormat) -> Result<()> {
    debug!(%format, "cmd_ask: called");
    if text.trim().is_empty() {
        return Err(eyre::eyre!("Nothing to ask: message is empty"));
    }

    let system_prompt = load_system_prompt(config)?;
    let mut session = Session::new(config.llm.clone(), system_prompt, factory)?;

    let usage = match session.submit(text).await {
        TurnOutcome::Answered { usage, turn } => {
            if format == OutputFormat::Text {
                println!("{}", turn.content());
            }
            Some(usage)
        }
        TurnOutcome::Failed(notice) => {
            // The notice already carries the message
            eprintln!("{}", render::render_notice(&notice));
            return Err(eyre::eyre!("turn failed"));
        }
        TurnOutcome::Ignored => None,
    };

    if format == OutputFormat::Json {
        let snapshot = session.snapshot();
        let transcript = AskTranscript {
            model: snapshot.model,
            temperature: snapshot.temperature,
            turns: snapshot.turns,
            usage,
        };
        println!("{}", serde_json::to_string_pretty(&transcript)?);
    }
    Ok(())
}

/// List installed models
async fn cmd_models(config: &Config) -> Result<()> {
    debug!("cmd_models: called");
    let client = llm::configure(&config.llm)?;
    let models = client.list_models().await?;

    if models.is_empty() {
        println!("{}", "No models installed. Try: ollama pull deepseek-r1:1.5b".dimmed());
        return Ok(());
    }

    for model in &models {
        let marker = if model.name == config.llm.model {
            "*".bright_green().to_string()
        } else {
            " ".to_string()
        };
        println!("{} {}", marker, render::render_model(model));
    }
    Ok(())
}
