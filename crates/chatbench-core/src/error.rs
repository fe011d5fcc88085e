//! Error types for chatbench.

use thiserror::Error;

/// A shared error type for every chatbench crate.
///
/// The variants follow the failure domains of the system: configuration,
/// the prompt source, the remote generative service and the results file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatbenchError {
    /// Missing or invalid configuration (e.g. no API key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The prompt source could not be opened or read
    #[error("File access error: {path} - {message}")]
    FileAccess { path: String, message: String },

    /// The remote service failed (network, auth, quota, malformed response)
    #[error("Service error{}: {message}", .status_code.map(|c| format!(" (HTTP {c})")).unwrap_or_default())]
    Service {
        status_code: Option<u16>,
        message: String,
    },

    /// The results file could not be created or written
    #[error("Output error: {path} - {message}")]
    Output { path: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatbenchError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a FileAccess error for the given path
    pub fn file_access(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileAccess {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a Service error without an HTTP status
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            status_code: None,
            message: message.into(),
        }
    }

    /// Creates a Service error carrying the HTTP status returned by the API
    pub fn service_with_status(status_code: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// Creates an Output error for the given path
    pub fn output(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Output {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_file_access(&self) -> bool {
        matches!(self, Self::FileAccess { .. })
    }

    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service { .. })
    }

    pub fn is_output(&self) -> bool {
        matches!(self, Self::Output { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<toml::de::Error> for ChatbenchError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid TOML: {err}"))
    }
}

/// A type alias for `Result<T, ChatbenchError>`.
pub type Result<T> = std::result::Result<T, ChatbenchError>;
