//! Error handling for sitesearch.
//!
//! This module provides:
//! - [`ApiError`]: failures of a single remote search call
//! - [`SiteError`]: the application error enum
//! - [`ErrorCode`]: standardized error codes for machine parsing
//! - [`StructuredError`]: rich error type with suggestion and context

mod codes;

use std::io;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;

/// Failure of one remote search call.
///
/// Cloneable because a single call can have several waiters (every caller
/// coalesced into it receives the same outcome).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("search request failed: {0}")]
    Network(String),

    #[error("search request timed out after {0:?}")]
    Timeout(Duration),

    #[error("search endpoint returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("search response could not be decoded: {0}")]
    Decode(String),

    #[error("search call abandoned before completion")]
    Abandoned,
}

impl ApiError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Network(_) => ErrorCode::NetworkUnreachable,
            Self::Timeout(_) => ErrorCode::NetworkTimeout,
            Self::Status { status: 401 | 403, .. } => ErrorCode::NetworkAuthFailed,
            Self::Status { .. } => ErrorCode::SearchRejected,
            Self::Decode(_) => ErrorCode::SearchResponseInvalid,
            Self::Abandoned => ErrorCode::SearchAbandoned,
        }
    }
}

/// Main error type for sitesearch operations.
#[derive(Error, Debug)]
pub enum SiteError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Interactive terminal required: {0}")]
    NotInteractive(String),
}

impl SiteError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Api(err) => err.code(),
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::Toml(_) => ErrorCode::SerializationError,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::Terminal(_) => ErrorCode::TerminalError,
            Self::NotInteractive(_) => ErrorCode::TerminalRequired,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::Api(ApiError::Status { status, .. }) => {
                Some(serde_json::json!({ "http_status": status }))
            }
            Self::Api(ApiError::Timeout(after)) => {
                Some(serde_json::json!({ "timeout_ms": after.as_millis() }))
            }
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_site_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "NETWORK_TIMEOUT")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 502)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "config", "network")
    pub category: String,
}

impl StructuredError {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_site_error(err: &SiteError) -> Self {
        let mut structured = Self::new(err.code(), err.to_string());
        structured.context = err.context();
        structured
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&SiteError> for StructuredError {
    fn from(err: &SiteError) -> Self {
        Self::from_site_error(err)
    }
}

/// Result type alias using SiteError.
pub type Result<T> = std::result::Result<T, SiteError>;
