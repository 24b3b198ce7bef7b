//! Tasmee Error Types
//!
//! Centralized error handling for the session core and its boundaries.

use thiserror::Error;

/// Central error type for Tasmee
#[derive(Error, Debug)]
pub enum TasmeeError {
    #[error("Speech recognition is not supported here")]
    Unsupported,

    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("Recognizer error: {0}")]
    Recognizer(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Invalid transcript script at line {line}: {reason}")]
    Script { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Tasmee operations
pub type TasmeeResult<T> = Result<T, TasmeeError>;

impl TasmeeError {
    /// Whether the error ends the capture session
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TasmeeError::Unsupported | TasmeeError::PermissionDenied(_)
        )
    }
}
