//! Error types for pipdesk operations.
//!
//! This module defines [`PipdeskError`], the primary error type used throughout
//! the backend, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every variant is recoverable and carries a message that can be shown
//!   to a user as-is
//! - Use `anyhow::Error` (via `PipdeskError::Other`) for unexpected errors
//! - [`PipdeskError::kind`] gives a stable tag for the JSON protocol

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pipdesk operations.
#[derive(Debug, Error)]
pub enum PipdeskError {
    /// Path is missing, not executable, or does not behave like Python.
    #[error("Invalid Python interpreter {}: {reason}", .path.display())]
    InvalidInterpreter { path: PathBuf, reason: String },

    /// Directory could not be opened for browsing.
    #[error("Cannot read directory {}: {message}", .path.display())]
    PathUnreadable { path: PathBuf, message: String },

    /// Package listing failed or produced unusable output.
    #[error("Cannot list packages for {}: {message}", .python.display())]
    InventoryUnavailable { python: PathBuf, message: String },

    /// Package index request failed.
    #[error("Package index unavailable: {message}")]
    IndexUnavailable { message: String },

    /// Another mutating operation is running against the same interpreter.
    #[error("Another package operation is already running for {}", .python.display())]
    OperationInProgress { python: PathBuf },

    /// pip exited with a non-zero status.
    #[error("pip {action} {package} failed with {}{}", format_code(.code), format_output(.output))]
    OperationFailed {
        action: String,
        package: String,
        code: Option<i32>,
        output: Vec<String>,
    },

    /// The operation was cancelled before it finished.
    #[error("pip {action} {package} was cancelled")]
    OperationCancelled { action: String, package: String },

    /// A request was rejected before any work started.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config at {}: {message}", .path.display())]
    ConfigParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipdeskError {
    /// Stable snake_case tag used by the JSON protocol.
    pub fn kind(&self) -> &'static str {
        match self {
            PipdeskError::InvalidInterpreter { .. } => "invalid_interpreter",
            PipdeskError::PathUnreadable { .. } => "path_unreadable",
            PipdeskError::InventoryUnavailable { .. } => "inventory_unavailable",
            PipdeskError::IndexUnavailable { .. } => "index_unavailable",
            PipdeskError::OperationInProgress { .. } => "operation_in_progress",
            PipdeskError::OperationFailed { .. } => "operation_failed",
            PipdeskError::OperationCancelled { .. } => "operation_cancelled",
            PipdeskError::InvalidRequest { .. } => "invalid_request",
            PipdeskError::ConfigParseError { .. } => "config_parse_error",
            PipdeskError::Io(_) => "io",
            PipdeskError::Other(_) => "other",
        }
    }

    /// Shorthand for an [`PipdeskError::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        PipdeskError::InvalidRequest {
            message: message.into(),
        }
    }
}

fn format_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

fn format_output(output: &[String]) -> String {
    match output.last() {
        Some(last) => format!(" ({})", last),
        None => String::new(),
    }
}

/// Result type alias for pipdesk operations.
pub type Result<T> = std::result::Result<T, PipdeskError>;
