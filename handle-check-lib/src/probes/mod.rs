//! Probe strategies.
//!
//! A strategy knows how to reach one class of platform: which transport to
//! use, which URL to hit, and which extractor interprets the answer. It never
//! returns an error: every failure becomes an `Availability::Error` inside
//! the [`ProbeOutcome`].

use crate::credentials::Credentials;
use crate::protocols::{DnsResolver, HttpTransport, PageRenderer};
use crate::types::ProbeOutcome;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub mod dns;
pub mod graph;
pub mod oauth;
pub mod profile;
pub mod rendered;

pub use dns::DnsProbe;
pub use graph::GraphApiProbe;
pub use oauth::{BearerTokenProbe, ClientCredentialsProbe};
pub use profile::ProfilePageProbe;
pub use rendered::RenderedPageProbe;

/// Transports and credentials shared by every probe of a checker.
#[derive(Clone)]
pub struct ProbeContext {
    pub http: Arc<dyn HttpTransport>,
    pub dns: Arc<dyn DnsResolver>,
    pub renderer: Arc<dyn PageRenderer>,
    pub credentials: Arc<Credentials>,
}

impl fmt::Debug for ProbeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeContext")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Transport class a strategy uses, for listings and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    ProfilePage,
    GraphApi,
    Dns,
    ClientCredentials,
    BearerToken,
    RenderedPage,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeKind::ProfilePage => "profile page",
            ProbeKind::GraphApi => "graph API",
            ProbeKind::Dns => "DNS",
            ProbeKind::ClientCredentials => "OAuth API",
            ProbeKind::BearerToken => "bearer API",
            ProbeKind::RenderedPage => "rendered page",
        };
        f.write_str(name)
    }
}

/// One way of probing a platform.
#[async_trait]
pub trait ProbeStrategy: Send + Sync {
    fn kind(&self) -> ProbeKind;

    /// Whether the request must carry a TLD (the generic `web` platform).
    fn requires_tld(&self) -> bool {
        false
    }

    /// Probe `candidate`, which is already non-empty and TLD-qualified.
    async fn probe(&self, candidate: &str, ctx: &ProbeContext) -> ProbeOutcome;
}

/// Substitute the percent-encoded candidate for `{name}` in a URL template.
pub(crate) fn fill_url(template: &str, candidate: &str) -> String {
    template.replace("{name}", &urlencoding::encode(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_url_encodes_candidate() {
        assert_eq!(
            fill_url("https://github.com/{name}/", "octocat"),
            "https://github.com/octocat/"
        );
        assert_eq!(
            fill_url("https://medium.com/@{name}", "a b/c"),
            "https://medium.com/@a%20b%2Fc"
        );
    }
}
