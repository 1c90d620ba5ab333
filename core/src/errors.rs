//! Error types for Callsight LLM operations

use thiserror::Error;

/// Errors raised by completion transports and model catalogs.
///
/// Every variant is an infrastructure failure. These always reach the caller
/// unmodified; nothing in this workspace retries or masks them.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("LLM provider returned {status} {status_text}: {body}")]
    RemoteError {
        /// Numeric HTTP status code
        status: u16,
        /// Canonical reason phrase for the status
        status_text: String,
        /// Raw response body text
        body: String,
    },

    #[error("LLM call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("LLM call cancelled by caller")]
    Cancelled,

    #[error("Streaming response returned a success status without a body")]
    EmptyBody,

    #[error("Failed to parse LLM response: {0}")]
    ResponseParseError(String),
}

impl LlmError {
    /// Build a remote error from its three diagnostic parts
    pub fn remote(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self::RemoteError {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// Whether a caller-side retry is likely to help
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError(_) | Self::Timeout { .. } => true,
            Self::RemoteError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status of a remote failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Reasons a structured-task reply could not be turned into a typed result.
///
/// Never returned from the public task API; the task runner converts it into
/// the task's fallback value.
#[derive(Error, Debug)]
pub enum StructuredOutputError {
    #[error("Model output is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Model output has an unexpected shape: {0}")]
    UnexpectedShape(String),
}

/// Result type alias for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;
