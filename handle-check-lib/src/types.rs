//! Core data types for availability checking.
//!
//! This module defines the request and verdict types shared by every probe,
//! along with the checker configuration.

use crate::error::{ErrorCode, ProbeError};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::time::Duration;

/// Identifier of a probe target, e.g. `"github"`, `"com"` or `"web"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformId(String);

impl PlatformId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlatformId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlatformId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for PlatformId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A candidate name to check, optionally with a TLD for domain platforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRequest {
    /// Username or domain label
    pub name: String,

    /// TLD appended to `name` before probing (domain platforms only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tld: Option<String>,
}

impl ProbeRequest {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            tld: None,
        }
    }

    /// Attach a TLD. `"com"` and `".com"` are equivalent.
    pub fn with_tld<T: Into<String>>(mut self, tld: T) -> Self {
        self.tld = Some(tld.into());
        self
    }

    /// The TLD, normalized to carry a leading dot, or `None` when absent or blank.
    pub fn normalized_tld(&self) -> Option<String> {
        let tld = self.tld.as_deref()?.trim();
        let tld = tld.trim_start_matches('.');
        if tld.is_empty() {
            None
        } else {
            Some(format!(".{}", tld))
        }
    }

    /// The identifier a strategy actually probes, trimmed.
    ///
    /// Only strategies that take a TLD (`takes_tld`) see `name + tld`. Every
    /// other strategy gets the bare name and the TLD is ignored.
    pub fn candidate(&self, takes_tld: bool) -> String {
        let name = self.name.trim();
        match self.normalized_tld() {
            Some(tld) if takes_tld && !name.is_empty() => format!("{}{}", name, tld),
            _ => name.to_string(),
        }
    }
}

/// Verdict of a single probe.
///
/// Exactly one of the three states holds. Anything a heuristic cannot
/// interpret with confidence is an `Error`, never a guessed boolean.
///
/// Serializes to `{"available": bool}` or `{"error": "<ErrorCode>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "CheckResponse", try_from = "CheckResponse")]
pub enum Availability {
    /// The identifier appears unclaimed
    Available,
    /// The identifier appears claimed
    Unavailable,
    /// Availability could not be determined
    Error { code: ErrorCode },
}

impl Availability {
    pub fn from_available(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    pub fn error(code: ErrorCode) -> Self {
        Self::Error { code }
    }

    /// `Some(true)` for available, `Some(false)` for taken, `None` for errors.
    pub fn available(&self) -> Option<bool> {
        match self {
            Self::Available => Some(true),
            Self::Unavailable => Some(false),
            Self::Error { .. } => None,
        }
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Error { code } => Some(*code),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl From<ProbeError> for Availability {
    fn from(err: ProbeError) -> Self {
        Self::Error { code: err.code() }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::Error { code } => write!(f, "error ({})", code),
        }
    }
}

/// Wire shape of [`Availability`]: exactly one field is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
}

impl From<Availability> for CheckResponse {
    fn from(availability: Availability) -> Self {
        Self {
            available: availability.available(),
            error: availability.error_code(),
        }
    }
}

impl TryFrom<CheckResponse> for Availability {
    type Error = String;

    fn try_from(response: CheckResponse) -> Result<Self, String> {
        match (response.available, response.error) {
            (Some(available), None) => Ok(Availability::from_available(available)),
            (None, Some(code)) => Ok(Availability::error(code)),
            (Some(_), Some(_)) => Err("response carries both 'available' and 'error'".into()),
            (None, None) => Err("response carries neither 'available' nor 'error'".into()),
        }
    }
}

/// What a probe strategy hands back to the dispatcher.
///
/// `status` is the last HTTP status observed, recorded for observability
/// only. It never influences the verdict after the strategy returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub availability: Availability,
    pub status: Option<u16>,
}

impl ProbeOutcome {
    pub fn new(availability: Availability, status: Option<u16>) -> Self {
        Self {
            availability,
            status,
        }
    }

    pub fn from_error(err: ProbeError, status: Option<u16>) -> Self {
        Self {
            availability: err.into(),
            status,
        }
    }
}

/// Configuration options for the availability checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Upper bound for one probe, including every request it makes.
    /// Default: 5 seconds, Range: 100ms-60s
    #[serde(skip)]
    pub timeout: Duration,

    /// Maximum number of platforms probed at once by batch checks.
    /// Default: 10, Range: 1-100
    pub concurrency: usize,

    /// User-Agent sent with every HTTP request
    pub user_agent: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            concurrency: 10,
            user_agent: format!("handle-check/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CheckConfig {
    /// Set custom concurrency, capped at 100.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    /// Set custom per-probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.clamp(Duration::from_millis(100), Duration::from_secs(60));
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
