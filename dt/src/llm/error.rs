//! Inference client error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while configuring or calling the inference runtime
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse failure class shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Runtime unreachable or handle misconfigured
    Connection,
    /// Runtime accepted the request but produced no answer
    Generation,
}

impl ClientError {
    /// Classify a transport error, separating connect failures and timeouts
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Network(err)
        }
    }

    /// Which side of the boundary failed
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Connection(_) => FailureKind::Connection,
            Self::Api { .. }
            | Self::Runtime(_)
            | Self::Timeout(_)
            | Self::Network(_)
            | Self::InvalidResponse(_)
            | Self::Json(_) => FailureKind::Generation,
        }
    }

    pub fn is_connection(&self) -> bool {
        self.kind() == FailureKind::Connection
    }

    /// Ollama answers 404 for models that were never pulled
    pub fn is_model_missing(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(
            ClientError::Connection("refused".to_string()).kind(),
            FailureKind::Connection
        );
        assert_eq!(
            ClientError::Api {
                status: 500,
                message: "boom".to_string()
            }
            .kind(),
            FailureKind::Generation
        );
        assert_eq!(
            ClientError::Timeout(Duration::from_secs(1)).kind(),
            FailureKind::Generation
        );
        assert!(ClientError::Connection("x".to_string()).is_connection());
        assert!(!ClientError::Runtime("x".to_string()).is_connection());
    }

    #[test]
    fn test_is_model_missing() {
        assert!(
            ClientError::Api {
                status: 404,
                message: "model not found".to_string()
            }
            .is_model_missing()
        );
        assert!(
            !ClientError::Api {
                status: 500,
                message: "boom".to_string()
            }
            .is_model_missing()
        );
    }
}
