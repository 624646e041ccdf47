use crate::error::{RenderError, TransportError};
use async_trait::async_trait;

/// A browser-like engine that can load a URL and hand back the rendered DOM.
///
/// A single renderer is shared by the search client and the page fetcher;
/// callers navigate one page at a time.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Navigate to `url`, returning once the initial load finished
    async fn goto(&self, url: &str) -> Result<(), RenderError>;

    /// Current `document.readyState`
    async fn ready_state(&self) -> Result<String, RenderError>;

    /// Serialized DOM of the current page
    async fn source(&self) -> Result<String, RenderError>;
}

/// Plain HTTP retrieval used when rendering fails
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url`; only a 200 with a non-empty body is a success
    async fn get(&self, url: &str) -> Result<String, TransportError>;
}

/// Finds candidate URLs for a query
#[async_trait]
pub trait Discover: Send + Sync {
    /// Ordered, duplicate-free list of at most `max_urls` fetchable URLs
    async fn discover_urls(&self, query: &str, page_count: usize, max_urls: usize) -> Vec<String>;
}

/// Retrieves page HTML, returning an empty string on any failure
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch_html(&self, url: &str) -> String;
}
