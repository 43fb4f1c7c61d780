//! Error types shared across InstaVid crates.

use std::path::PathBuf;

/// Top-level error type for InstaVid operations.
#[derive(Debug, thiserror::Error)]
pub enum InstavidError {
    #[error("Render error: {message}")]
    Render { message: String },

    /// A second export was requested while one is still running.
    #[error("Export already in progress")]
    ExportInProgress,

    #[error("Export cancelled")]
    Cancelled,

    #[error("Encoder error: {message}")]
    Encode { message: String },

    #[error("Audio error: {message}")]
    Audio { message: String },

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using InstavidError.
pub type InstavidResult<T> = Result<T, InstavidError>;

impl InstavidError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio {
            message: msg.into(),
        }
    }

    pub fn validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// True for failures that leave no partial artifact behind and can be
    /// retried by the caller as-is.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ExportInProgress | Self::Cancelled)
    }
}
