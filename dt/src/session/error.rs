//! Session error types

use thiserror::Error;

/// Rejected configuration actions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("Temperature must be between 0.0 and 1.0, got {0}")]
    TemperatureOutOfRange(f32),

    #[error("Unknown panel: {0}. Use: settings, developer, or model")]
    UnknownPanel(String),
}
