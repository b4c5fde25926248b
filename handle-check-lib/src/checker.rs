//! Main availability checker implementation.
//!
//! This module provides the `AvailabilityChecker`, the single entry point
//! that validates a request, looks the platform up in the registry, runs its
//! probe strategy under a time bound and reports the verdict.

use crate::credentials::Credentials;
use crate::error::{ErrorCode, HandleCheckError};
use crate::observe::{ProbeObserver, ProbeRecord, TracingObserver};
use crate::probes::ProbeContext;
#[cfg(feature = "headless")]
use crate::protocols::ChromeRenderer;
#[cfg(not(feature = "headless"))]
use crate::protocols::DisabledRenderer;
use crate::protocols::{DnsResolver, HickoryResolver, HttpTransport, PageRenderer, ReqwestTransport};
use crate::registry::PlatformRegistry;
use crate::types::{Availability, CheckConfig, PlatformId, ProbeRequest};
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

/// Checks candidate names against registered platforms.
///
/// The checker holds only shared, immutable state, so one instance can serve
/// any number of concurrent callers.
///
/// # Example
///
/// ```rust,no_run
/// use handle_check_lib::{AvailabilityChecker, ProbeRequest};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = AvailabilityChecker::new()?;
///     let verdict = checker
///         .check_availability("github", &ProbeRequest::new("octocat"))
///         .await;
///     println!("github/octocat: {}", verdict);
///     Ok(())
/// }
/// ```
pub struct AvailabilityChecker {
    config: CheckConfig,
    registry: Arc<PlatformRegistry>,
    context: ProbeContext,
    observer: Arc<dyn ProbeObserver>,
}

impl AvailabilityChecker {
    /// Create a checker with default configuration, no credentials and the
    /// built-in platforms.
    pub fn new() -> Result<Self, HandleCheckError> {
        Self::builder().build()
    }

    /// Create a checker with custom configuration and credentials.
    pub fn with_config(
        config: CheckConfig,
        credentials: Credentials,
    ) -> Result<Self, HandleCheckError> {
        Self::builder().config(config).credentials(credentials).build()
    }

    pub fn builder() -> CheckerBuilder {
        CheckerBuilder::default()
    }

    /// Check one candidate on one platform.
    ///
    /// Never fails: every outcome, including bad input and unknown
    /// platforms, is an [`Availability`]. Performs at most one probe and no
    /// retries.
    ///
    /// - unknown platform: `Error { UnknownPlatform }`, no I/O
    /// - empty identifier, or missing TLD where one is required:
    ///   `Error { InvalidInput }`, no I/O
    /// - a TLD on a platform that does not take one is ignored
    /// - probe exceeding the configured timeout: `Error { Timeout }`
    pub async fn check_availability(&self, platform_id: &str, request: &ProbeRequest) -> Availability {
        let Some(entry) = self.registry.get(platform_id) else {
            tracing::debug!(platform = platform_id, "rejected unknown platform");
            return Availability::error(ErrorCode::UnknownPlatform);
        };

        let takes_tld = entry.strategy.requires_tld();
        let candidate = request.candidate(takes_tld);
        if candidate.is_empty() {
            tracing::debug!(platform = platform_id, "rejected empty identifier");
            return Availability::error(ErrorCode::InvalidInput);
        }
        if takes_tld && request.normalized_tld().is_none() {
            tracing::debug!(platform = platform_id, "rejected request without TLD");
            return Availability::error(ErrorCode::InvalidInput);
        }
        if !takes_tld && request.normalized_tld().is_some() {
            tracing::debug!(platform = platform_id, "ignoring TLD for platform without one");
        }

        let started = Instant::now();
        let outcome = tokio::time::timeout(
            self.config.timeout,
            entry.strategy.probe(&candidate, &self.context),
        )
        .await;
        let latency = started.elapsed();

        let (availability, status) = match outcome {
            Ok(outcome) => (outcome.availability, outcome.status),
            Err(_) => (Availability::error(ErrorCode::Timeout), None),
        };

        self.observer.on_probe(&ProbeRecord {
            platform: platform_id,
            candidate: &candidate,
            availability,
            status,
            latency,
        });

        availability
    }

    /// Check one candidate on many platforms concurrently.
    ///
    /// Results come back in input order. Each platform gets exactly one
    /// independent probe; at most `concurrency` run at once.
    pub async fn check_platforms(
        &self,
        platforms: &[PlatformId],
        request: &ProbeRequest,
    ) -> Vec<(PlatformId, Availability)> {
        futures::stream::iter(platforms.iter().cloned())
            .map(move |platform| async move {
                let availability = self.check_availability(platform.as_str(), request).await;
                (platform, availability)
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    /// Check one candidate on many platforms, yielding results as they
    /// complete rather than in input order.
    pub fn check_platforms_stream<'a>(
        &'a self,
        platforms: &[PlatformId],
        request: &'a ProbeRequest,
    ) -> Pin<Box<dyn Stream<Item = (PlatformId, Availability)> + Send + 'a>> {
        let platforms = platforms.to_vec();
        let stream = futures::stream::iter(platforms)
            .map(move |platform| async move {
                let availability = self.check_availability(platform.as_str(), request).await;
                (platform, availability)
            })
            .buffer_unordered(self.config.concurrency.max(1));

        Box::pin(stream)
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }
}

/// Assembles an [`AvailabilityChecker`], defaulting every unset part.
#[derive(Default)]
pub struct CheckerBuilder {
    config: Option<CheckConfig>,
    credentials: Option<Credentials>,
    registry: Option<Arc<PlatformRegistry>>,
    http: Option<Arc<dyn HttpTransport>>,
    dns: Option<Arc<dyn DnsResolver>>,
    renderer: Option<Arc<dyn PageRenderer>>,
    observer: Option<Arc<dyn ProbeObserver>>,
}

impl CheckerBuilder {
    pub fn config(mut self, config: CheckConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn registry(mut self, registry: Arc<PlatformRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn http_transport(mut self, http: Arc<dyn HttpTransport>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn dns_resolver(mut self, dns: Arc<dyn DnsResolver>) -> Self {
        self.dns = Some(dns);
        self
    }

    pub fn page_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ProbeObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> Result<AvailabilityChecker, HandleCheckError> {
        let config = self.config.unwrap_or_default();

        let http = match self.http {
            Some(http) => http,
            None => Arc::new(ReqwestTransport::new(&config)?),
        };
        let dns = self
            .dns
            .unwrap_or_else(|| Arc::new(HickoryResolver::new(config.timeout)));
        let renderer = self.renderer.unwrap_or_else(default_renderer);

        Ok(AvailabilityChecker {
            registry: self.registry.unwrap_or_else(PlatformRegistry::builtin),
            context: ProbeContext {
                http,
                dns,
                renderer,
                credentials: Arc::new(self.credentials.unwrap_or_default()),
            },
            observer: self
                .observer
                .unwrap_or_else(|| Arc::new(TracingObserver)),
            config,
        })
    }
}

#[cfg(feature = "headless")]
fn default_renderer() -> Arc<dyn PageRenderer> {
    Arc::new(ChromeRenderer::new())
}

#[cfg(not(feature = "headless"))]
fn default_renderer() -> Arc<dyn PageRenderer> {
    Arc::new(DisabledRenderer)
}
