//! Error handling for availability checking.
//!
//! Two layers of errors live here:
//!
//! - [`HandleCheckError`] covers setup: loading configuration, building the
//!   registry, constructing transports. These surface as `Result`s from
//!   constructors and loaders.
//! - [`ProbeError`] covers a single probe that could not reach a verdict. It
//!   never escapes a probe strategy; it is collapsed into an [`ErrorCode`] and
//!   returned inside [`Availability::Error`](crate::Availability).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Main error type for setup and configuration operations.
#[derive(Debug, Clone, Error)]
pub enum HandleCheckError {
    /// Configuration errors (invalid settings, bad TOML, etc.)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// File I/O errors when reading configuration files
    #[error("File error at '{path}': {message}")]
    File { path: String, message: String },

    /// A platform id was registered twice
    #[error("Platform '{platform}' is already registered")]
    DuplicatePlatform { platform: String },

    /// The HTTP client could not be constructed
    #[error("Failed to create HTTP client: {message}")]
    HttpClient { message: String },

    /// Generic internal errors that don't fit other categories
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl HandleCheckError {
    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::File {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new duplicate registration error.
    pub fn duplicate_platform<P: Into<String>>(platform: P) -> Self {
        Self::DuplicatePlatform {
            platform: platform.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for HandleCheckError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

/// Why a probe could not determine availability.
///
/// This is the public, serializable half of the error contract: it is what
/// callers see in `{"error": "..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The caller sent an empty or malformed identifier
    InvalidInput,
    /// The platform id is not registered
    UnknownPlatform,
    /// Credentials were missing or rejected
    AuthFailure,
    /// Network-level fault or an HTTP status no heuristic understands
    TransportFailure,
    /// The probe did not finish within its time bound
    Timeout,
    /// The remote answered with a shape the extractor could not interpret
    UnexpectedResponse,
}

impl ErrorCode {
    /// Whether the caller may reasonably retry the same check.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportFailure | Self::Timeout)
    }

    /// Stable string form, identical to the serialized value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::UnknownPlatform => "UnknownPlatform",
            Self::AuthFailure => "AuthFailure",
            Self::TransportFailure => "TransportFailure",
            Self::Timeout => "Timeout",
            Self::UnexpectedResponse => "UnexpectedResponse",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single probe's failure to reach a verdict.
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    /// Credentials were rejected by the platform
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The platform needs credentials that are not configured
    #[error("Missing credentials for {platform}")]
    MissingCredential { platform: String },

    /// Connection, DNS-upstream or protocol failure
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The operation exceeded its time bound
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The platform answered with a status the heuristic does not map
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    /// The body did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ProbeError {
    /// Create a new transport error.
    pub fn transport<M: Into<String>>(message: M) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new unexpected-response error.
    pub fn unexpected<M: Into<String>>(message: M) -> Self {
        Self::UnexpectedResponse(message.into())
    }

    /// Collapse into the public error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Auth(_) | Self::MissingCredential { .. } => ErrorCode::AuthFailure,
            Self::Transport(_) | Self::UnexpectedStatus { .. } => ErrorCode::TransportFailure,
            Self::Timeout(_) => ErrorCode::Timeout,
            Self::UnexpectedResponse(_) => ErrorCode::UnexpectedResponse,
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not report the configured bound
            Self::Timeout(Duration::ZERO)
        } else if err.is_connect() {
            Self::Transport(format!("Connection failed: {}", err.without_url()))
        } else if err.is_decode() {
            Self::UnexpectedResponse(format!("Body decoding failed: {}", err.without_url()))
        } else {
            Self::Transport(format!("HTTP request failed: {}", err.without_url()))
        }
    }
}

impl From<serde_json::Error> for ProbeError {
    fn from(err: serde_json::Error) -> Self {
        Self::UnexpectedResponse(format!("JSON parsing failed: {}", err))
    }
}
