//! Headless Chromium renderer.
//!
//! One browser process is launched lazily on the first render and shared by
//! every probe afterwards. Each render opens its own page (tab) and closes it
//! before returning. If the render future is dropped mid-flight, e.g. by the
//! dispatcher's timeout, the page is closed from a spawned task instead.

use crate::error::ProbeError;
use crate::protocols::browser::{PageRenderer, RenderedPage};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;

struct PooledBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl Drop for PooledBrowser {
    fn drop(&mut self) {
        // Dropping the browser kills the child process; the event loop must go too
        self.handler.abort();
    }
}

/// Closes the page on drop unless [`PageGuard::close`] already did.
struct PageGuard {
    page: Option<Page>,
}

impl PageGuard {
    fn new(page: Page) -> Self {
        Self { page: Some(page) }
    }

    async fn close(mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::warn!(error = %e, "failed to close browser page");
            }
        }
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                runtime.spawn(async move {
                    let _ = page.close().await;
                });
            }
        }
    }
}

/// Pooled headless Chromium renderer.
pub struct ChromeRenderer {
    browser: OnceCell<PooledBrowser>,
}

impl ChromeRenderer {
    pub fn new() -> Self {
        Self {
            browser: OnceCell::new(),
        }
    }

    async fn browser(&self) -> Result<&Browser, ProbeError> {
        let pooled = self.browser.get_or_try_init(launch).await?;
        Ok(&pooled.browser)
    }
}

impl Default for ChromeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

async fn launch() -> Result<PooledBrowser, ProbeError> {
    let config = BrowserConfig::builder()
        .arg("--no-sandbox")
        .build()
        .map_err(|e| ProbeError::transport(format!("Invalid browser configuration: {}", e)))?;

    let (browser, mut events) = Browser::launch(config)
        .await
        .map_err(|e| ProbeError::transport(format!("Failed to launch browser: {}", e)))?;

    let handler = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    tracing::info!("launched pooled headless browser");

    Ok(PooledBrowser { browser, handler })
}

async fn inspect(page: &Page, url: &str) -> Result<RenderedPage, ProbeError> {
    page.goto(url)
        .await
        .map_err(|e| ProbeError::transport(format!("Navigation failed: {}", e)))?;

    let title = page
        .get_title()
        .await
        .map_err(|e| ProbeError::unexpected(format!("Could not read page title: {}", e)))?;
    let content = page
        .content()
        .await
        .map_err(|e| ProbeError::unexpected(format!("Could not read page content: {}", e)))?;

    Ok(RenderedPage { title, content })
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage, ProbeError> {
        let browser = self.browser().await?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ProbeError::transport(format!("Failed to open page: {}", e)))?;

        let guard = PageGuard::new(page.clone());
        let result = inspect(&page, url).await;
        guard.close().await;

        result
    }
}
