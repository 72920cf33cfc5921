//! Deeptok - terminal chat with a locally hosted language model
//!
//! Deeptok sends each user message, wrapped in a fixed Korean-only persona
//! prompt, to an Ollama runtime and keeps the exchange in an in-memory
//! transcript for the life of the session.
//!
//! # Modules
//!
//! - [`conversation`] - Turns and the append-only conversation store
//! - [`prompts`] - System prompt loading and request composition
//! - [`llm`] - Inference client trait and Ollama implementation
//! - [`session`] - Turn-taking controller and per-session settings
//! - [`repl`] - Interactive terminal front-end
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod prompts;
pub mod repl;
pub mod session;

// Re-export commonly used types
pub use config::{Config, LlmConfig, RuntimeOptions};
pub use conversation::{ConversationStore, Role, Turn};
pub use llm::{
    ClientError, ClientFactory, FailureKind, Generation, InferenceClient, ModelInfo, OllamaClient, StreamChunk,
    TokenUsage, configure,
};
pub use prompts::{PromptLoader, compose};
pub use session::{Notice, Panel, Session, SessionError, SessionSettings, SessionSnapshot, SessionState, TurnOutcome};
