//! Domain platforms probed by IPv4 resolution.

use super::{ProbeContext, ProbeKind, ProbeStrategy};
use crate::extract;
use crate::types::{Availability, ProbeOutcome};
use async_trait::async_trait;

/// Resolve the candidate as a hostname.
///
/// With a fixed `tld` (the `com`, `io`, ... pseudo-platforms) the TLD is
/// appended here. Without one the request must already carry it.
#[derive(Debug, Clone)]
pub struct DnsProbe {
    tld: Option<&'static str>,
}

impl DnsProbe {
    /// Probe `<name>.<tld>`.
    pub const fn with_tld(tld: &'static str) -> Self {
        Self { tld: Some(tld) }
    }

    /// Probe the candidate as given; the caller supplies the TLD.
    pub const fn any_tld() -> Self {
        Self { tld: None }
    }

    fn hostname(&self, candidate: &str) -> String {
        match self.tld {
            Some(tld) => format!("{}.{}", candidate, tld),
            None => candidate.to_string(),
        }
    }
}

#[async_trait]
impl ProbeStrategy for DnsProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Dns
    }

    fn requires_tld(&self) -> bool {
        self.tld.is_none()
    }

    async fn probe(&self, candidate: &str, ctx: &ProbeContext) -> ProbeOutcome {
        let outcome = ctx.dns.resolve_ipv4(&self.hostname(candidate)).await;

        match extract::from_dns(&outcome) {
            Ok(available) => ProbeOutcome::new(Availability::from_available(available), None),
            Err(e) => ProbeOutcome::from_error(e, None),
        }
    }
}
