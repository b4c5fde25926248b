//! DNS transport for domain pseudo-platforms.
//!
//! Availability of a domain is approximated by whether it resolves to an
//! IPv4 address. A registered domain without A records looks exactly like an
//! unregistered one under this method.

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;
use std::net::Ipv4Addr;
use std::time::Duration;
use thiserror::Error;

/// Outcome of a failed IPv4 lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DnsError {
    /// NXDOMAIN, or the name exists with no A records
    #[error("no A records for '{0}'")]
    NotFound(String),

    /// No answer within the resolver's time bound
    #[error("DNS lookup timed out")]
    Timeout,

    /// Upstream unreachable, malformed answer, etc.
    #[error("DNS lookup failed: {0}")]
    Failed(String),
}

/// Something that can resolve a hostname to IPv4 addresses.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, DnsError>;
}

/// Production resolver backed by hickory.
pub struct HickoryResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryResolver {
    /// Build a resolver from the system configuration, falling back to
    /// public defaults when it cannot be read.
    pub fn new(timeout: Duration) -> Self {
        let (config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
            Ok(system) => system,
            Err(e) => {
                tracing::warn!(error = %e, "could not read system DNS configuration, using defaults");
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        opts.timeout = timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl DnsResolver for HickoryResolver {
    async fn resolve_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, DnsError> {
        // Fully qualified, so search domains never apply
        let fqdn = if host.ends_with('.') {
            host.to_string()
        } else {
            format!("{}.", host)
        };

        tracing::debug!(host = %fqdn, "resolving A records");

        match self.resolver.ipv4_lookup(fqdn.as_str()).await {
            Ok(lookup) => {
                let addrs: Vec<Ipv4Addr> = lookup.iter().map(|a| a.0).collect();
                if addrs.is_empty() {
                    Err(DnsError::NotFound(host.to_string()))
                } else {
                    Ok(addrs)
                }
            }
            Err(e) => Err(classify(host, &e)),
        }
    }
}

fn classify(host: &str, err: &ResolveError) -> DnsError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => DnsError::NotFound(host.to_string()),
        ResolveErrorKind::Timeout => DnsError::Timeout,
        _ => DnsError::Failed(err.to_string()),
    }
}
