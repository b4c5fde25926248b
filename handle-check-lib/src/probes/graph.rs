//! Graph-style APIs queried without credentials.
//!
//! The call is expected to fail authentication, but the error message still
//! tells whether the object exists.

use super::{fill_url, ProbeContext, ProbeKind, ProbeStrategy};
use crate::extract;
use crate::protocols::HttpRequest;
use crate::types::{Availability, ProbeOutcome};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct GraphApiProbe {
    url: &'static str,
    marker: &'static str,
}

impl GraphApiProbe {
    pub const fn new(url: &'static str, marker: &'static str) -> Self {
        Self { url, marker }
    }
}

#[async_trait]
impl ProbeStrategy for GraphApiProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::GraphApi
    }

    async fn probe(&self, candidate: &str, ctx: &ProbeContext) -> ProbeOutcome {
        let request = HttpRequest::get(fill_url(self.url, candidate));

        match ctx.http.send(request).await {
            Ok(response) => match extract::from_error_message(&response, self.marker) {
                Ok(available) => {
                    ProbeOutcome::new(Availability::from_available(available), Some(response.status))
                }
                Err(e) => ProbeOutcome::from_error(e, Some(response.status)),
            },
            Err(e) => ProbeOutcome::from_error(e, None),
        }
    }
}
