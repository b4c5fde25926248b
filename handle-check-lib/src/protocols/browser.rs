//! Rendered-page transport for platforms that challenge plain HTTP clients.

use crate::error::ProbeError;
use async_trait::async_trait;

/// Title and serialized DOM of a page after the browser finished loading it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    pub title: Option<String>,
    pub content: String,
}

/// Something that can load a URL in a full browser engine.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<RenderedPage, ProbeError>;
}

/// Renderer used when the crate is built without the `headless` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRenderer;

#[async_trait]
impl PageRenderer for DisabledRenderer {
    async fn render(&self, _url: &str) -> Result<RenderedPage, ProbeError> {
        Err(ProbeError::transport("headless rendering is not enabled"))
    }
}
