use crate::config::{EngineConfig, PauseConfig};
use crate::crawlers::crawler::{Discover, Renderer};
use crate::decode::resolve_real_url;
use crate::error::RenderError;
use crate::filter::UrlFilter;
use crate::parsers::html::select_links;
use async_trait::async_trait;
use std::collections::HashSet;

/// Queries every configured engine through the shared renderer and merges
/// their result links into one deduplicated, capped list
pub struct SearchClient<'a, R: Renderer> {
    renderer: &'a R,
    engines: &'a [EngineConfig],
    filter: &'a UrlFilter,
    pauses: PauseConfig,
    results_per_page: usize,
}

/// Insertion-ordered URL set with a hard cap
#[derive(Debug)]
struct UrlCollector {
    urls: Vec<String>,
    seen: HashSet<String>,
    max_urls: usize,
}

impl UrlCollector {
    fn new(max_urls: usize) -> Self {
        Self {
            urls: Vec::new(),
            seen: HashSet::new(),
            max_urls,
        }
    }

    fn is_full(&self) -> bool {
        self.urls.len() >= self.max_urls
    }

    /// Adds an unseen URL; returns whether it was added
    fn push(&mut self, url: String) -> bool {
        if self.is_full() || self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }
}

impl<'a, R: Renderer> SearchClient<'a, R> {
    pub fn new(
        renderer: &'a R,
        engines: &'a [EngineConfig],
        filter: &'a UrlFilter,
        pauses: PauseConfig,
        results_per_page: usize,
    ) -> Self {
        Self {
            renderer,
            engines,
            filter,
            pauses,
            results_per_page,
        }
    }

    /// Loads one result page and returns its raw HTML
    async fn load_result_page(&self, page_url: &str) -> Result<String, RenderError> {
        self.renderer.goto(page_url).await?;
        self.pauses.search.pause().await;
        self.renderer.source().await
    }

    /// Decodes and filters the raw links of one result page into `collector`
    fn collect_links(&self, html: &str, engine: &EngineConfig, collector: &mut UrlCollector) -> usize {
        let mut added = 0;
        for href in select_links(html, &engine.selectors) {
            let real = resolve_real_url(&href);
            if !self.filter.is_fetchable(&real) {
                continue;
            }
            if collector.push(real) {
                added += 1;
            }
            if collector.is_full() {
                break;
            }
        }
        added
    }
}

#[async_trait]
impl<R: Renderer> Discover for SearchClient<'_, R> {
    async fn discover_urls(&self, query: &str, page_count: usize, max_urls: usize) -> Vec<String> {
        let mut collector = UrlCollector::new(max_urls);

        'engines: for engine in self.engines {
            for page in 0..page_count {
                if collector.is_full() {
                    break 'engines;
                }

                let page_url = engine.result_page_url(query, page, self.results_per_page);
                ::log::info!("[SEARCH] {} -> {}", engine.name, page_url);

                match self.load_result_page(&page_url).await {
                    Ok(html) => {
                        let added = self.collect_links(&html, engine, &mut collector);
                        ::log::debug!(
                            "{} page {} contributed {} new urls ({} total)",
                            engine.name,
                            page,
                            added,
                            collector.urls.len()
                        );
                    }
                    Err(RenderError::Timeout(secs)) => {
                        ::log::warn!(
                            "Search page load timed out after {}s for {} (continuing)",
                            secs,
                            page_url
                        );
                    }
                    Err(e) => {
                        ::log::error!("Search on {} failed for {}: {}", engine.name, page_url, e);
                    }
                }

                self.pauses.between_pages.pause().await;
            }
        }

        ::log::info!(
            "Discovered {} candidate urls for query: {}",
            collector.urls.len(),
            query
        );
        collector.urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Pagination, default_engines};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned HTML per URL and records navigation order
    #[derive(Default)]
    struct StubRenderer {
        pages: HashMap<String, String>,
        failing: HashSet<String>,
        current: Mutex<Option<String>>,
        visited: Mutex<Vec<String>>,
    }

    impl StubRenderer {
        fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn with_failure(mut self, url: &str) -> Self {
            self.failing.insert(url.to_string());
            self
        }

        fn visited(&self) -> Vec<String> {
            self.visited.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Renderer for StubRenderer {
        async fn goto(&self, url: &str) -> Result<(), RenderError> {
            self.visited.lock().unwrap().push(url.to_string());
            if self.failing.contains(url) {
                return Err(RenderError::Timeout(30));
            }
            *self.current.lock().unwrap() = Some(url.to_string());
            Ok(())
        }

        async fn ready_state(&self) -> Result<String, RenderError> {
            Ok("complete".to_string())
        }

        async fn source(&self) -> Result<String, RenderError> {
            let current = self.current.lock().unwrap().clone().unwrap_or_default();
            Ok(self.pages.get(&current).cloned().unwrap_or_default())
        }
    }

    fn engine(name: &str, selector: &str) -> EngineConfig {
        EngineConfig::new(
            name,
            &format!("https://{}.test/search?q={{query}}&start={{start}}", name),
            Pagination::Offset,
            &[selector],
        )
    }

    fn anchors(class: &str, hrefs: &[&str]) -> String {
        hrefs
            .iter()
            .map(|h| format!(r#"<a class="{}" href="{}">r</a>"#, class, h))
            .collect::<Vec<_>>()
            .join("")
    }

    #[tokio::test]
    async fn test_merges_engines_in_order_without_duplicates() {
        let engines = vec![engine("alpha", "a.hit"), engine("beta", "a.res")];
        let renderer = StubRenderer::default()
            .with_page(
                "https://alpha.test/search?q=roma+music&start=0",
                &anchors(
                    "hit",
                    &[
                        "https://one.example/",
                        "https://two.example/",
                        "https://one.example/",
                    ],
                ),
            )
            .with_page(
                "https://alpha.test/search?q=roma+music&start=10",
                &anchors("hit", &["https://three.example/"]),
            )
            .with_page(
                "https://beta.test/search?q=roma+music&start=0",
                &anchors(
                    "res",
                    &[
                        "https://two.example/",
                        "//duckduckgo.com/l/?uddg=https%3A%2F%2Ffour.example%2F",
                    ],
                ),
            );
        let filter = UrlFilter::default();
        let client = SearchClient::new(&renderer, &engines, &filter, PauseConfig::none(), 10);

        let urls = client.discover_urls("roma music", 2, 100).await;
        assert_eq!(
            urls,
            vec![
                "https://one.example/",
                "https://two.example/",
                "https://three.example/",
                "https://four.example/",
            ]
        );
        assert_eq!(renderer.visited().len(), 4);
    }

    #[tokio::test]
    async fn test_unsafe_links_filtered() {
        let engines = vec![engine("alpha", "a.hit")];
        let renderer = StubRenderer::default().with_page(
            "https://alpha.test/search?q=x&start=0",
            &anchors(
                "hit",
                &[
                    "javascript:void(0)",
                    "/relative/link",
                    "http://localhost/admin",
                    "http://10.0.0.8/",
                    "https://files.example/report.PDF",
                    "https://ok.example/article",
                ],
            ),
        );
        let filter = UrlFilter::default();
        let client = SearchClient::new(&renderer, &engines, &filter, PauseConfig::none(), 10);

        let urls = client.discover_urls("x", 1, 50).await;
        assert_eq!(urls, vec!["https://ok.example/article"]);
    }

    #[tokio::test]
    async fn test_cap_stops_discovery_early() {
        let engines = vec![engine("alpha", "a.hit"), engine("beta", "a.hit")];
        let hrefs: Vec<String> = (0..10).map(|i| format!("https://site{}.example/", i)).collect();
        let refs: Vec<&str> = hrefs.iter().map(String::as_str).collect();
        let renderer = StubRenderer::default()
            .with_page("https://alpha.test/search?q=x&start=0", &anchors("hit", &refs));
        let filter = UrlFilter::default();
        let client = SearchClient::new(&renderer, &engines, &filter, PauseConfig::none(), 10);

        let urls = client.discover_urls("x", 3, 4).await;
        assert_eq!(urls.len(), 4);
        assert_eq!(urls[0], "https://site0.example/");
        // Cap reached on the first page: nothing else is requested
        assert_eq!(renderer.visited(), vec!["https://alpha.test/search?q=x&start=0"]);
    }

    #[tokio::test]
    async fn test_failed_page_does_not_abort() {
        let engines = vec![engine("alpha", "a.hit"), engine("beta", "a.hit")];
        let renderer = StubRenderer::default()
            .with_failure("https://alpha.test/search?q=x&start=0")
            .with_page(
                "https://alpha.test/search?q=x&start=10",
                &anchors("hit", &["https://after-timeout.example/"]),
            )
            .with_page(
                "https://beta.test/search?q=x&start=0",
                &anchors("hit", &["https://beta.example/"]),
            );
        let filter = UrlFilter::default();
        let client = SearchClient::new(&renderer, &engines, &filter, PauseConfig::none(), 10);

        let urls = client.discover_urls("x", 2, 50).await;
        assert_eq!(
            urls,
            vec!["https://after-timeout.example/", "https://beta.example/"]
        );
        assert_eq!(renderer.visited().len(), 4);
    }

    #[tokio::test]
    async fn test_no_duplicates_and_cap_invariant() {
        let engines = default_engines();
        let renderer = StubRenderer::default();
        let filter = UrlFilter::default();
        let client = SearchClient::new(&renderer, &engines, &filter, PauseConfig::none(), 10);

        // Every engine returns nothing: all pages are still visited, result empty
        let urls = client.discover_urls("romani", 2, 10).await;
        assert!(urls.is_empty());
        assert_eq!(renderer.visited().len(), 8);
        assert!(renderer.visited()[4].starts_with("https://yandex.com/search/?text=romani&p=0"));

        let mut collector = UrlCollector::new(2);
        assert!(collector.push("https://a.example/".to_string()));
        assert!(!collector.push("https://a.example/".to_string()));
        assert!(collector.push("https://b.example/".to_string()));
        assert!(!collector.push("https://c.example/".to_string()));
        assert_eq!(collector.urls.len(), 2);
    }
}
