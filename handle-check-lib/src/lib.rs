//! # Handle Check Library
//!
//! Checks whether a username or domain name is still free on a set of
//! online platforms.
//!
//! Every platform is probed its own way (a profile URL status, a DNS
//! lookup, an authenticated API call or a rendered page), but callers only
//! see one answer shape: [`Availability`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use handle_check_lib::{AvailabilityChecker, ProbeRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = AvailabilityChecker::new()?;
//!     let verdict = checker
//!         .check_availability("github", &ProbeRequest::new("octocat"))
//!         .await;
//!
//!     println!("github/octocat: {}", verdict);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **One verdict shape**: available, unavailable or a classified error
//! - **Pluggable I/O**: HTTP, DNS and page rendering sit behind traits
//! - **Concurrent batches**: probe many platforms with bounded concurrency
//! - **Headless rendering**: optional, behind the `headless` feature

pub use checker::{AvailabilityChecker, CheckerBuilder};
pub use config::{
    load_env_config, load_env_config_from, parse_timeout_string, ConfigManager, EnvConfig,
    FileConfig,
};
pub use credentials::{ClientCredentials, Credentials, Secret};
pub use error::{ErrorCode, HandleCheckError, ProbeError};
pub use observe::{NoopObserver, ProbeObserver, ProbeRecord, TracingObserver};
pub use registry::{PlatformEntry, PlatformGroup, PlatformRegistry, RegistryBuilder};
pub use types::{Availability, CheckConfig, CheckResponse, PlatformId, ProbeOutcome, ProbeRequest};

// Extension points for custom platforms and test doubles
pub mod probes;
pub mod protocols;

mod checker;
mod config;
mod credentials;
mod error;
mod extract;
mod observe;
mod registry;
mod types;

pub type Result<T> = std::result::Result<T, HandleCheckError>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

/// Get library information for debugging or display purposes.
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        author: AUTHOR,
        features: get_enabled_features(),
    }
}

/// Information about the library build and features
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub version: &'static str,
    pub author: &'static str,
    pub features: Vec<&'static str>,
}

#[allow(clippy::vec_init_then_push)]
fn get_enabled_features() -> Vec<&'static str> {
    let mut features = Vec::new();

    #[cfg(feature = "headless")]
    features.push("headless");

    features
}
