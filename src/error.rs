// src/error.rs

use serde_json::Error as SerdeError;
use std::io;
use thiserror::Error;

/// Custom error types for the application
#[derive(Error, Debug)]
pub enum AppError {
    /// Cookie source misconfigured or unreachable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Option set is structurally invalid
    #[error("Validation error: {0}")]
    Validation(String),

    /// yt-dlp exited with a non-zero code; captured output is kept for display
    #[error("yt-dlp failed with exit code {exit_code}: {stderr}")]
    ToolFailure {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    /// Unexpected output shape (playlist JSON, scraped text)
    #[error("Parse error: {0}")]
    Parse(String),

    /// A command was built without a target URL
    #[error("No URL was set on the command builder")]
    MissingUrl,

    /// User-requested stop; not surfaced as an error to the user
    #[error("Download cancelled")]
    Cancelled,

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] SerdeError),

    /// General application errors
    #[error("Application error: {0}")]
    General(String),
}

impl AppError {
    /// True when this error came from a user stop request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled)
    }
}

/// Convert a string error to AppError::General
impl From<String> for AppError {
    fn from(error: String) -> Self {
        AppError::General(error)
    }
}

/// Convert a &str error to AppError::General
impl From<&str> for AppError {
    fn from(error: &str) -> Self {
        AppError::General(error.to_string())
    }
}
