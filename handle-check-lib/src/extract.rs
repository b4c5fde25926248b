//! Signal extractors.
//!
//! Each function turns one raw transport outcome into a verdict. They are
//! pure: no I/O, no state. `Ok(true)` means available, `Ok(false)` means
//! taken, and anything ambiguous is an `Err`.

use crate::error::ProbeError;
use crate::protocols::{DnsError, HttpResponse, RenderedPage};
use serde::Deserialize;
use std::net::Ipv4Addr;

/// Profile pages: 200 means the page exists, 404 means it does not.
pub fn from_status(status: u16) -> Result<bool, ProbeError> {
    match status {
        200 => Ok(false),
        404 => Ok(true),
        status => Err(ProbeError::UnexpectedStatus { status }),
    }
}

#[derive(Deserialize)]
struct GraphErrorBody {
    error: GraphError,
}

#[derive(Deserialize)]
struct GraphError {
    message: String,
}

/// Graph-style APIs that reject unauthenticated calls but still say why.
///
/// A non-2xx body whose `error.message` contains `marker` (case-insensitive)
/// means the object does not exist. Any other message means it does. A 2xx
/// answer is unexpected since the call carries no credentials.
pub fn from_error_message(response: &HttpResponse, marker: &str) -> Result<bool, ProbeError> {
    if response.is_success() {
        return Err(ProbeError::unexpected(format!(
            "unauthenticated lookup succeeded with status {}",
            response.status
        )));
    }

    let body: GraphErrorBody = response
        .json()
        .map_err(|_| ProbeError::unexpected("response has no error.message"))?;

    Ok(contains_ignore_case(&body.error.message, marker))
}

/// IPv4 resolution: no records means the domain is free.
pub fn from_dns(outcome: &Result<Vec<Ipv4Addr>, DnsError>) -> Result<bool, ProbeError> {
    match outcome {
        Ok(addrs) if !addrs.is_empty() => Ok(false),
        Ok(_) | Err(DnsError::NotFound(_)) => Ok(true),
        Err(DnsError::Timeout) => Err(ProbeError::Timeout(std::time::Duration::ZERO)),
        Err(DnsError::Failed(message)) => Err(ProbeError::transport(message.clone())),
    }
}

#[derive(Deserialize)]
struct TokenBody {
    access_token: Option<String>,
}

/// Client-credentials token exchange. Returns the bearer token.
pub fn access_token(response: &HttpResponse) -> Result<String, ProbeError> {
    match response.status {
        200..=299 => {}
        400 | 401 | 403 => {
            return Err(ProbeError::Auth(format!(
                "token endpoint rejected client credentials ({})",
                response.status
            )))
        }
        status => return Err(ProbeError::UnexpectedStatus { status }),
    }

    let body: TokenBody = response.json()?;
    match body.access_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(ProbeError::unexpected("token response has no access_token")),
    }
}

#[derive(Deserialize)]
struct UserList {
    data: Option<Vec<serde_json::Value>>,
}

/// Authenticated lookup returning a `data` array of matches.
pub fn from_user_list(response: &HttpResponse) -> Result<bool, ProbeError> {
    check_lookup_status(response)?;

    let body: UserList = response.json()?;
    match body.data {
        Some(users) => Ok(users.is_empty()),
        None => Err(ProbeError::unexpected("lookup response has no data array")),
    }
}

#[derive(Deserialize)]
struct UserLookup {
    data: Option<serde_json::Value>,
    errors: Option<Vec<LookupError>>,
}

#[derive(Deserialize)]
struct LookupError {
    title: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    detail: Option<String>,
}

impl LookupError {
    fn is_not_found(&self) -> bool {
        [&self.title, &self.kind, &self.detail]
            .into_iter()
            .flatten()
            .any(|text| contains_ignore_case(text, "not found") || contains_ignore_case(text, "resource-not-found"))
    }
}

/// Authenticated lookup returning a single `data` object.
///
/// Errors come back with status 200. A not-found error means the name is
/// free; any other error (suspended, forbidden) means someone holds it.
pub fn from_user_lookup(response: &HttpResponse) -> Result<bool, ProbeError> {
    check_lookup_status(response)?;

    let body: UserLookup = response.json()?;
    match (body.data, body.errors) {
        (Some(_), _) => Ok(false),
        (None, Some(errors)) if !errors.is_empty() => {
            Ok(errors.iter().any(LookupError::is_not_found))
        }
        _ => Err(ProbeError::unexpected("lookup response has neither data nor errors")),
    }
}

fn check_lookup_status(response: &HttpResponse) -> Result<(), ProbeError> {
    match response.status {
        200..=299 => Ok(()),
        401 | 403 => Err(ProbeError::Auth(format!(
            "lookup rejected bearer token ({})",
            response.status
        ))),
        status => Err(ProbeError::UnexpectedStatus { status }),
    }
}

/// Where a rendered-page marker is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerTarget {
    Title,
    Content,
}

/// Rendered pages: the marker text means the profile does not exist.
pub fn from_rendered(page: &RenderedPage, marker: &str, target: MarkerTarget) -> bool {
    match target {
        MarkerTarget::Title => page
            .title
            .as_deref()
            .is_some_and(|title| contains_ignore_case(title, marker)),
        MarkerTarget::Content => contains_ignore_case(&page.content, marker),
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
