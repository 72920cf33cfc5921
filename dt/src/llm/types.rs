//! Inference request/response types

use serde::{Deserialize, Serialize};

/// A finished generation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Generation {
    /// The complete response text
    pub text: String,

    /// Token accounting reported by the runtime
    pub usage: TokenUsage,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
        }
    }
}

/// Token usage for one generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub output_tokens: u64,
}

/// Incremental output delivered while a generation is running
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    /// Partial response text
    TextDelta(String),

    /// Generation finished
    Done { usage: TokenUsage },
}

/// A model installed in the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,

    /// Size on disk in bytes
    #[serde(default)]
    pub size: Option<u64>,
}
