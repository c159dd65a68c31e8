//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 3xx: Config errors
//! - 4xx: Search errors
//! - 5xx: Network errors
//! - 6xx: Terminal errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for machine output.
///
/// Each variant maps to a numeric code (e.g., `ConfigInvalid` -> E302).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E304: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Search errors (4xx)
    // ========================================
    /// E401: Search endpoint rejected the request
    SearchRejected,
    /// E402: Search response could not be decoded
    SearchResponseInvalid,
    /// E403: Search call was abandoned before it completed
    SearchAbandoned,

    // ========================================
    // Network errors (5xx)
    // ========================================
    /// E501: Cannot reach the search endpoint
    NetworkUnreachable,
    /// E502: Network request timed out
    NetworkTimeout,
    /// E503: Authentication with the search endpoint failed
    NetworkAuthFailed,

    // ========================================
    // Terminal errors (6xx)
    // ========================================
    /// E601: Interactive terminal required
    TerminalRequired,
    /// E602: Terminal could not be driven
    TerminalError,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E905: Serialization failed
    SerializationError,
    /// E906: File operation failed
    IoError,
}

impl ErrorCode {
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 304,

            Self::SearchRejected => 401,
            Self::SearchResponseInvalid => 402,
            Self::SearchAbandoned => 403,

            Self::NetworkUnreachable => 501,
            Self::NetworkTimeout => 502,
            Self::NetworkAuthFailed => 503,

            Self::TerminalRequired => 601,
            Self::TerminalError => 602,

            Self::SerializationError => 905,
            Self::IoError => 906,
        }
    }

    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::ConfigInvalid => "Run `sitesearch config --show` to see current values. Check TOML syntax in the config file",
            Self::ConfigMissingRequired => "Set the value in ~/.config/sitesearch/config.toml or through its SITESEARCH_* environment variable",

            Self::SearchRejected => "The search endpoint refused the query. Check [api].endpoint and the query parameter name",
            Self::SearchResponseInvalid => "The endpoint answered with an unexpected payload. Make sure [api].endpoint points at the search route",
            Self::SearchAbandoned => "The search was interrupted before it finished. Retry the query",

            Self::NetworkUnreachable => "Check your network connection and ensure the search endpoint is reachable",
            Self::NetworkTimeout => "The endpoint is slow or unreachable. Raise [api].timeout_secs if it is merely slow",
            Self::NetworkAuthFailed => "Verify the token in [api].auth_token or SITESEARCH_API_TOKEN",

            Self::TerminalRequired => "Run `sitesearch tui` from an interactive terminal, or use `sitesearch query` in scripts",
            Self::TerminalError => "The terminal could not be driven. Try a different terminal emulator",

            Self::SerializationError => "The data could not be serialized. Please report this issue with the full output",
            Self::IoError => "File operation failed. Check the path exists and permissions are correct",
        }
    }

    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::SerializationError)
    }

    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            3 => "config",
            4 => "search",
            5 => "network",
            6 => "terminal",
            9 => "internal",
            _ => "unknown",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::SearchRejected,
            Self::SearchResponseInvalid,
            Self::SearchAbandoned,
            Self::NetworkUnreachable,
            Self::NetworkTimeout,
            Self::NetworkAuthFailed,
            Self::TerminalRequired,
            Self::TerminalError,
            Self::SerializationError,
            Self::IoError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
