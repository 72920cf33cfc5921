//! Inference client module for Deeptok
//!
//! Adapts the external text-generation runtime behind one trait.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod ollama;
mod types;

pub use client::InferenceClient;
pub use error::{ClientError, FailureKind};
pub use ollama::OllamaClient;
pub use types::{Generation, ModelInfo, StreamChunk, TokenUsage};

use crate::config::LlmConfig;

/// Builds a configured client handle from settings
///
/// The session calls this once per turn with its current temperature, so a
/// test can substitute any closure with this shape.
pub type ClientFactory = Arc<dyn Fn(&LlmConfig) -> Result<Arc<dyn InferenceClient>, ClientError> + Send + Sync>;

/// Create a client handle based on the provider specified in config
pub fn configure(config: &LlmConfig) -> Result<Arc<dyn InferenceClient>, ClientError> {
    debug!(provider = %config.provider, model = %config.model, "configure: called");
    match config.provider.as_str() {
        "ollama" => {
            debug!("configure: creating Ollama client");
            Ok(Arc::new(OllamaClient::from_config(config)?))
        }
        other => {
            debug!(%other, "configure: unknown provider");
            Err(ClientError::Connection(format!(
                "Unknown LLM provider '{}'. Supported: ollama",
                other
            )))
        }
    }
}

/// Wrap a closure as a [`ClientFactory`]
pub fn factory<F>(f: F) -> ClientFactory
where
    F: Fn(&LlmConfig) -> Result<Arc<dyn InferenceClient>, ClientError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Factory that builds real runtime clients
pub fn default_factory() -> ClientFactory {
    factory(configure)
}
