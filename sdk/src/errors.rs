//! Error types and handling
//!
//! This module provides the error types used throughout the Nexus engine.
//! All errors implement the `NexusErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.

use std::path::PathBuf;
use thiserror::Error;

/// Trait for Nexus error extensions
///
/// Provides additional context for errors, including user-friendly hints and
/// recoverability information. All engine errors implement this trait.
pub trait NexusErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors typically require fixing configuration or the environment.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration
/// - **Tool**: Capability faults, missing or invalid parameters
/// - **File System**: Path validation and access errors
/// - **Persistence**: Durable storage that could not be read or written
/// - **Network**: Lookups against remote services
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, NexusErrorExt};
///
/// let error = EngineError::MissingParameter("expression".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = EngineError::Config("bad log level".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Tool errors
    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Calculation error: {0}")]
    Calculation(String),

    // File system errors
    #[error("Path denied: {0:?}")]
    PathDenied(PathBuf),

    #[error("Path outside workspace: {0:?}")]
    PathOutsideWorkspace(PathBuf),

    #[error("Path canonicalization failed for {0:?}: {1}")]
    PathCanonicalization(PathBuf, String),

    // Persistence errors
    #[error("Persistence error for {path:?}: {message}")]
    Persistence { path: PathBuf, message: String },

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Render the chain of underlying causes, one per line.
    ///
    /// Returns `None` when the error has no source.
    pub fn trace(&self) -> Option<String> {
        let mut current = std::error::Error::source(self)?;
        let mut lines = vec![format!("caused by: {}", current)];
        while let Some(next) = current.source() {
            lines.push(format!("caused by: {}", next));
            current = next;
        }
        Some(lines.join("\n"))
    }
}

impl NexusErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",

            Self::ToolError(_) => "Tool operation failed",
            Self::MissingParameter(_) => "The step is missing a required parameter",
            Self::InvalidParameter(_) => "The step was given an invalid parameter",
            Self::UnknownOperation(_) => "Unknown operation requested",
            Self::Calculation(_) => "Check the expression and try again",

            Self::PathDenied(_) => "Access to this path is not allowed",
            Self::PathOutsideWorkspace(_) => "Operation must be within workspace",
            Self::PathCanonicalization(_, _) => "Invalid path specified",

            Self::Persistence { .. } => "Could not access stored data. Check the data directory",

            Self::Network(_) => "Network operation failed. Check your connection",

            Self::Json(_) => "Data could not be parsed",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::Config(_) => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}
