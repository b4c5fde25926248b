//! Plain profile pages: GET the page and read the status code.

use super::{fill_url, ProbeContext, ProbeKind, ProbeStrategy};
use crate::extract;
use crate::protocols::HttpRequest;
use crate::types::{Availability, ProbeOutcome};
use async_trait::async_trait;

/// GET `url` with `{name}` substituted; 404 means available.
#[derive(Debug, Clone)]
pub struct ProfilePageProbe {
    url: &'static str,
}

impl ProfilePageProbe {
    pub const fn new(url: &'static str) -> Self {
        Self { url }
    }
}

#[async_trait]
impl ProbeStrategy for ProfilePageProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::ProfilePage
    }

    async fn probe(&self, candidate: &str, ctx: &ProbeContext) -> ProbeOutcome {
        let request = HttpRequest::get(fill_url(self.url, candidate)).without_body();

        match ctx.http.send(request).await {
            Ok(response) => match extract::from_status(response.status) {
                Ok(available) => {
                    ProbeOutcome::new(Availability::from_available(available), Some(response.status))
                }
                Err(e) => ProbeOutcome::from_error(e, Some(response.status)),
            },
            Err(e) => ProbeOutcome::from_error(e, None),
        }
    }
}
