//! Bot-defensive sites probed through a real browser engine.
//!
//! Plain HTTP clients get challenge pages or redirects from these sites, so
//! the status code means nothing. The rendered page is searched for a
//! platform-specific "not found" marker instead.

use super::{fill_url, ProbeContext, ProbeKind, ProbeStrategy};
use crate::extract::{self, MarkerTarget};
use crate::types::{Availability, ProbeOutcome};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct RenderedPageProbe {
    url: &'static str,
    marker: &'static str,
    target: MarkerTarget,
}

impl RenderedPageProbe {
    /// Marker searched in the page title.
    pub const fn title(url: &'static str, marker: &'static str) -> Self {
        Self {
            url,
            marker,
            target: MarkerTarget::Title,
        }
    }

    /// Marker searched in the page body.
    pub const fn content(url: &'static str, marker: &'static str) -> Self {
        Self {
            url,
            marker,
            target: MarkerTarget::Content,
        }
    }
}

#[async_trait]
impl ProbeStrategy for RenderedPageProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::RenderedPage
    }

    async fn probe(&self, candidate: &str, ctx: &ProbeContext) -> ProbeOutcome {
        match ctx.renderer.render(&fill_url(self.url, candidate)).await {
            Ok(page) => {
                let available = extract::from_rendered(&page, self.marker, self.target);
                ProbeOutcome::new(Availability::from_available(available), None)
            }
            Err(e) => ProbeOutcome::from_error(e, None),
        }
    }
}
