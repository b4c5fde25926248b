//! Platform credentials.
//!
//! Loaded once at startup and shared read-only by every probe. Secret values
//! never appear in `Debug` output, log fields or verdicts.

use std::collections::HashMap;
use std::fmt;

/// A secret string with a redacted `Debug` representation.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    /// The raw value. Only transports should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// OAuth client id/secret pair for the client-credentials grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: Secret,
}

impl ClientCredentials {
    pub fn new<I: Into<String>, S: Into<String>>(client_id: I, client_secret: S) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret),
        }
    }
}

/// Credentials for every platform that needs them, keyed by platform id.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    client: HashMap<String, ClientCredentials>,
    bearer: HashMap<String, Secret>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client_credentials<P: Into<String>>(
        mut self,
        platform: P,
        credentials: ClientCredentials,
    ) -> Self {
        self.client.insert(platform.into(), credentials);
        self
    }

    pub fn with_bearer_token<P: Into<String>, T: Into<String>>(mut self, platform: P, token: T) -> Self {
        self.bearer.insert(platform.into(), Secret::new(token));
        self
    }

    pub fn client_credentials(&self, platform: &str) -> Option<&ClientCredentials> {
        self.client.get(platform)
    }

    pub fn bearer_token(&self, platform: &str) -> Option<&Secret> {
        self.bearer.get(platform)
    }

    /// Platforms with any credential configured, sorted.
    pub fn configured_platforms(&self) -> Vec<&str> {
        let mut platforms: Vec<&str> = self
            .client
            .keys()
            .chain(self.bearer.keys())
            .map(String::as_str)
            .collect();
        platforms.sort_unstable();
        platforms.dedup();
        platforms
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    pub fn merge(mut self, other: Credentials) -> Self {
        self.client.extend(other.client);
        self.bearer.extend(other.bearer);
        self
    }
}
