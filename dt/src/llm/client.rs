//! InferenceClient trait definition

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ClientError, Generation, ModelInfo, StreamChunk};

/// Configured handle to an external text-generation runtime
///
/// A handle is bound to one model, temperature and set of runtime options.
/// Each call is independent: only the prompt passed in reaches the model.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Model identifier this handle targets
    fn model(&self) -> &str;

    /// Send a prompt and wait for the complete response
    async fn generate(&self, prompt: &str) -> Result<Generation, ClientError>;

    /// Send a prompt, forwarding partial text to `chunk_tx` as it arrives
    ///
    /// Returns the same complete response `generate` would.
    async fn stream(&self, prompt: &str, chunk_tx: mpsc::Sender<StreamChunk>) -> Result<Generation, ClientError>;

    /// Models installed in the runtime
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ClientError>;
}
