//! Authenticated API lookups.
//!
//! [`ClientCredentialsProbe`] exchanges a client id/secret for a bearer token
//! on every call, then looks the user up. The token lives only for that one
//! lookup. [`BearerTokenProbe`] uses a long-lived token from configuration.

use super::{fill_url, ProbeContext, ProbeKind, ProbeStrategy};
use crate::error::ProbeError;
use crate::extract;
use crate::protocols::HttpRequest;
use crate::types::{Availability, ProbeOutcome};
use async_trait::async_trait;

/// Client-credentials grant followed by a lookup returning a `data` array.
#[derive(Debug, Clone)]
pub struct ClientCredentialsProbe {
    /// Key into [`Credentials`](crate::Credentials)
    credential: &'static str,
    token_url: &'static str,
    lookup_url: &'static str,
}

impl ClientCredentialsProbe {
    pub const fn new(
        credential: &'static str,
        token_url: &'static str,
        lookup_url: &'static str,
    ) -> Self {
        Self {
            credential,
            token_url,
            lookup_url,
        }
    }
}

#[async_trait]
impl ProbeStrategy for ClientCredentialsProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::ClientCredentials
    }

    async fn probe(&self, candidate: &str, ctx: &ProbeContext) -> ProbeOutcome {
        let Some(client) = ctx.credentials.client_credentials(self.credential) else {
            return ProbeOutcome::from_error(
                ProbeError::MissingCredential {
                    platform: self.credential.to_string(),
                },
                None,
            );
        };

        // Secrets travel in the form body, never in the URL
        let token_request = HttpRequest::post(self.token_url)
            .form_field("client_id", client.client_id.as_str())
            .form_field("client_secret", client.client_secret.expose())
            .form_field("grant_type", "client_credentials");

        let token_response = match ctx.http.send(token_request).await {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::from_error(e, None),
        };
        let token = match extract::access_token(&token_response) {
            Ok(token) => token,
            Err(e) => return ProbeOutcome::from_error(e, Some(token_response.status)),
        };

        let lookup = HttpRequest::get(fill_url(self.lookup_url, candidate))
            .header("Authorization", format!("Bearer {}", token))
            .header("Client-Id", client.client_id.as_str());

        match ctx.http.send(lookup).await {
            Ok(response) => match extract::from_user_list(&response) {
                Ok(available) => {
                    ProbeOutcome::new(Availability::from_available(available), Some(response.status))
                }
                Err(e) => ProbeOutcome::from_error(e, Some(response.status)),
            },
            Err(e) => ProbeOutcome::from_error(e, None),
        }
    }
}

/// Lookup authorized by a configured bearer token.
#[derive(Debug, Clone)]
pub struct BearerTokenProbe {
    credential: &'static str,
    lookup_url: &'static str,
}

impl BearerTokenProbe {
    pub const fn new(credential: &'static str, lookup_url: &'static str) -> Self {
        Self {
            credential,
            lookup_url,
        }
    }
}

#[async_trait]
impl ProbeStrategy for BearerTokenProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::BearerToken
    }

    async fn probe(&self, candidate: &str, ctx: &ProbeContext) -> ProbeOutcome {
        let Some(token) = ctx.credentials.bearer_token(self.credential) else {
            return ProbeOutcome::from_error(
                ProbeError::MissingCredential {
                    platform: self.credential.to_string(),
                },
                None,
            );
        };

        let lookup = HttpRequest::get(fill_url(self.lookup_url, candidate))
            .header("Authorization", format!("Bearer {}", token.expose()));

        match ctx.http.send(lookup).await {
            Ok(response) => match extract::from_user_lookup(&response) {
                Ok(available) => {
                    ProbeOutcome::new(Availability::from_available(available), Some(response.status))
                }
                Err(e) => ProbeOutcome::from_error(e, Some(response.status)),
            },
            Err(e) => ProbeOutcome::from_error(e, None),
        }
    }
}
