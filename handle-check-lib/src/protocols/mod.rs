//! Transport implementations used by the probe strategies.
//!
//! Each transport is a trait with one production implementation, so probes
//! can be exercised offline against test doubles.

/// HTTP requests (profile pages, platform APIs, OAuth token endpoints)
pub mod http;

/// IPv4 resolution for domain platforms
pub mod dns;

/// Rendered-page inspection for bot-defensive platforms
pub mod browser;

/// Pooled headless Chromium
#[cfg(feature = "headless")]
pub mod chrome;

// Re-export commonly used types
pub use browser::{DisabledRenderer, PageRenderer, RenderedPage};
#[cfg(feature = "headless")]
pub use chrome::ChromeRenderer;
pub use dns::{DnsError, DnsResolver, HickoryResolver};
pub use http::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
