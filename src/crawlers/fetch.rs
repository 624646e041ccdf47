use crate::config::Delay;
use crate::crawlers::crawler::{Fetch, Renderer, Transport};
use crate::error::{FetchError, RenderError};
use crate::filter::is_local_or_internal;
use crate::results::PageDocument;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// How often the ready state is polled while waiting for a page
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fetches page HTML through the renderer, falling back to plain HTTP
pub struct PageFetcher<'a, R: Renderer, T: Transport> {
    renderer: &'a R,
    transport: T,
    ready_timeout: Duration,
    settle: Delay,
}

impl<'a, R: Renderer, T: Transport> PageFetcher<'a, R, T> {
    pub fn new(renderer: &'a R, transport: T, ready_timeout: Duration, settle: Delay) -> Self {
        Self {
            renderer,
            transport,
            ready_timeout,
            settle,
        }
    }

    /// Two-tier fetch: rendered first, HTTP GET if rendering fails
    pub async fn fetch(&self, url: &str) -> Result<PageDocument, FetchError> {
        if is_local_or_internal(url) {
            ::log::info!("[SKIP] internal/local url: {}", url);
            return Err(FetchError::Rejected(url.to_string()));
        }

        match self.render(url).await {
            Ok(html) => return Ok(PageDocument::new(url, html)),
            Err(RenderError::Timeout(secs)) => {
                ::log::warn!(
                    "Render timed out after {}s for {}, trying http fallback",
                    secs,
                    url
                );
            }
            Err(e) => {
                ::log::warn!("Render failed for {}: {} -- trying http fallback", url, e);
            }
        }

        let html = self.transport.get(url).await?;
        Ok(PageDocument::new(url, html))
    }

    async fn render(&self, url: &str) -> Result<String, RenderError> {
        self.renderer.goto(url).await?;
        self.wait_until_ready().await;
        self.settle.pause().await;
        self.renderer.source().await
    }

    /// Polls `document.readyState` until complete or the wait times out.
    /// Failing to reach ready is not an error; whatever rendered is used.
    async fn wait_until_ready(&self) {
        let start = Instant::now();
        loop {
            match self.renderer.ready_state().await {
                Ok(state) if state == "complete" => return,
                Ok(_) => {}
                Err(e) => {
                    ::log::debug!("Ready state check failed: {}", e);
                    return;
                }
            }
            if start.elapsed() >= self.ready_timeout {
                ::log::debug!("Page not ready after {:?}, continuing", self.ready_timeout);
                return;
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl<R: Renderer, T: Transport> Fetch for PageFetcher<'_, R, T> {
    async fn fetch_html(&self, url: &str) -> String {
        match self.fetch(url).await {
            Ok(page) => page.html,
            Err(FetchError::Rejected(_)) => String::new(),
            Err(e) => {
                ::log::error!("Giving up on {}: {}", url, e);
                String::new()
            }
        }
    }
}
