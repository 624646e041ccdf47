use crate::error::HarvestError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A single topical query and the file its results should land in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Search phrase sent to every engine
    pub query: String,

    /// Desired output filename (sanitized, `.jsonl` appended if missing)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl QuerySpec {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: &str) -> Self {
        self.file = Some(file.to_string());
        self
    }
}

/// How an engine expresses which result page to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pagination {
    /// `{start}` is the index of the first result (page * results_per_page)
    Offset,
    /// `{start}` is the zero-based page number
    PageNumber,
}

/// Result-page template and link selectors for one search engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine identifier used in logs
    pub name: String,

    /// Result page URL with `{query}` and `{start}` placeholders
    pub url_template: String,

    #[serde(default = "default_pagination")]
    pub pagination: Pagination,

    /// CSS selectors for result anchors, tried in order
    pub selectors: Vec<String>,
}

impl EngineConfig {
    pub fn new(name: &str, url_template: &str, pagination: Pagination, selectors: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            url_template: url_template.to_string(),
            pagination,
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Builds the result page URL for `query` at zero-based `page`
    pub fn result_page_url(&self, query: &str, page: usize, results_per_page: usize) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let start = match self.pagination {
            Pagination::Offset => page * results_per_page,
            Pagination::PageNumber => page,
        };
        self.url_template
            .replace("{query}", &encoded)
            .replace("{start}", &start.to_string())
    }
}

/// Inclusive bounds for a randomized pause, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delay {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Delay {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    /// Picks a duration uniformly within the bounds
    pub fn sample(&self) -> Duration {
        let (lo, hi) = if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        };
        if lo == hi {
            return Duration::from_millis(lo);
        }
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }

    /// Sleeps for a sampled duration
    pub async fn pause(&self) {
        let duration = self.sample();
        if !duration.is_zero() {
            ::log::trace!("Pausing for {} ms", duration.as_millis());
            tokio::time::sleep(duration).await;
        }
    }
}

/// Inter-request pacing
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PauseConfig {
    /// After a search result page has been requested
    #[serde(default = "default_search_pause")]
    pub search: Delay,

    /// After a search result page has been parsed, before the next one
    #[serde(default = "default_between_pages_pause")]
    pub between_pages: Delay,

    /// After a rendered page signalled ready, for deferred content
    #[serde(default = "default_settle_pause")]
    pub settle: Delay,

    /// After every content page fetch
    #[serde(default = "default_fetch_pause")]
    pub fetch: Delay,
}

impl PauseConfig {
    /// No pauses at all, for tests and local fixtures
    pub const fn none() -> Self {
        Self {
            search: Delay::none(),
            between_pages: Delay::none(),
            settle: Delay::none(),
            fetch: Delay::none(),
        }
    }
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            search: default_search_pause(),
            between_pages: default_between_pages_pause(),
            settle: default_settle_pause(),
            fetch: default_fetch_pause(),
        }
    }
}

/// Configuration for a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Queries processed in order
    #[serde(default)]
    pub queries: Vec<QuerySpec>,

    /// Directory for per-query and combined output files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// User agent for both the browser and the HTTP fallback
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Result pages requested per engine
    #[serde(default = "default_pages_per_engine")]
    pub pages_per_engine: usize,

    /// Pagination stride for offset-paginated engines
    #[serde(default = "default_results_per_page")]
    pub results_per_page: usize,

    /// Cap on discovered URLs per query, across all engines
    #[serde(default = "default_max_urls_per_query")]
    pub max_urls_per_query: usize,

    /// Minimum length (in characters) of an extracted text block
    #[serde(default = "default_min_text_len")]
    pub min_text_len: usize,

    /// Tags whose text is extracted, in order
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,

    /// File extensions never fetched
    #[serde(default = "default_skip_extensions")]
    pub skip_extensions: Vec<String>,

    /// Regex patterns for URLs to exclude from discovery
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout_secs: u64,

    /// Upper bound on waiting for `document.readyState == "complete"`
    #[serde(default = "default_ready_state_timeout")]
    pub ready_state_timeout_secs: u64,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub pauses: PauseConfig,

    /// Search engines, queried in this order
    #[serde(default = "default_engines")]
    pub engines: Vec<EngineConfig>,

    /// Write `{query, text, url}` instead of `{text}` into per-query files
    #[serde(default)]
    pub record_provenance: bool,

    /// Combined `{text}` file for all queries
    #[serde(default = "default_combined_texts_file")]
    pub combined_texts_file: Option<String>,

    /// Combined `{query, text, url}` file for all queries
    #[serde(default = "default_combined_provenance_file")]
    pub combined_provenance_file: Option<String>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            queries: Vec::new(),
            output_dir: default_output_dir(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            user_agent: default_user_agent(),
            pages_per_engine: default_pages_per_engine(),
            results_per_page: default_results_per_page(),
            max_urls_per_query: default_max_urls_per_query(),
            min_text_len: default_min_text_len(),
            tags: default_tags(),
            skip_extensions: default_skip_extensions(),
            exclude_patterns: Vec::new(),
            page_load_timeout_secs: default_page_load_timeout(),
            ready_state_timeout_secs: default_ready_state_timeout(),
            http_timeout_secs: default_http_timeout(),
            pauses: PauseConfig::default(),
            engines: default_engines(),
            record_provenance: false,
            combined_texts_file: default_combined_texts_file(),
            combined_provenance_file: default_combined_provenance_file(),
        }
    }
}

impl HarvestConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HarvestError> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            HarvestError::Config(format!("cannot open {}: {}", path.display(), e))
        })?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, HarvestError> {
        serde_json::from_str(json).map_err(|e| HarvestError::Config(e.to_string()))
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    /// Ready-state wait, never longer than the page load timeout
    pub fn ready_state_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_state_timeout_secs.min(self.page_load_timeout_secs))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn default_pagination() -> Pagination {
    Pagination::Offset
}

fn default_search_pause() -> Delay {
    Delay::new(2250, 3000)
}

fn default_between_pages_pause() -> Delay {
    Delay::new(300, 800)
}

fn default_settle_pause() -> Delay {
    Delay::new(700, 1300)
}

fn default_fetch_pause() -> Delay {
    Delay::new(2100, 2800)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("scraped_content")
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36".to_string()
}

fn default_pages_per_engine() -> usize {
    3
}

fn default_results_per_page() -> usize {
    10
}

fn default_max_urls_per_query() -> usize {
    200
}

fn default_min_text_len() -> usize {
    500
}

fn default_tags() -> Vec<String> {
    crate::parsers::DEFAULT_TAGS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Extensions of binary and media files that are never fetched
pub fn default_skip_extensions() -> Vec<String> {
    [
        ".pdf", ".mp4", ".zip", ".exe", ".jpg", ".png", ".gif", ".svg", ".woff", ".woff2", ".ttf",
        ".eot", ".jpeg", ".webp", ".ico", ".rar", ".7z", ".tar", ".gz", ".dmg", ".msi", ".mp3",
        ".avi", ".mov", ".webm",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_page_load_timeout() -> u64 {
    30
}

fn default_ready_state_timeout() -> u64 {
    5
}

fn default_http_timeout() -> u64 {
    15
}

fn default_combined_texts_file() -> Option<String> {
    Some("texts_all.jsonl".to_string())
}

fn default_combined_provenance_file() -> Option<String> {
    Some("provenance_all.jsonl".to_string())
}

/// Built-in engine table
pub fn default_engines() -> Vec<EngineConfig> {
    vec![
        EngineConfig::new(
            "duckduckgo",
            "https://duckduckgo.com/?q={query}&s={start}",
            Pagination::Offset,
            &["a.result__a", "a[data-testid='result-title-a']"],
        ),
        EngineConfig::new(
            "bing",
            "https://www.bing.com/search?q={query}&first={start}",
            Pagination::Offset,
            &["li.b_algo h2 a", "li.b_algo a[href^='http']"],
        ),
        EngineConfig::new(
            "yandex",
            "https://yandex.com/search/?text={query}&p={start}",
            Pagination::PageNumber,
            &["a.link.link_theme_normal.organic__url", "a.organic__url"],
        ),
        EngineConfig::new(
            "aol",
            "https://search.aol.com/aol/search?q={query}&s_it=sb-top&b={start}",
            Pagination::Offset,
            &["div.algo a", "div.algo h3 a"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = HarvestConfig::from_json("{}").unwrap();
        assert_eq!(config.pages_per_engine, 3);
        assert_eq!(config.min_text_len, 500);
        assert_eq!(config.max_urls_per_query, 200);
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.engines.len(), 4);
        assert_eq!(config.engines[0].name, "duckduckgo");
        assert_eq!(config.engines[2].pagination, Pagination::PageNumber);
        assert!(config.tags.contains(&"li".to_string()));
        assert!(config.queries.is_empty());
    }

    #[test]
    fn test_queries_and_overrides() {
        let json = r#"{
            "queries": [
                {"query": "Romani music traditions", "file": "music.jsonl"},
                {"query": "Romani proverbs"}
            ],
            "min_text_len": 50,
            "pauses": {"fetch": {"min_ms": 0, "max_ms": 0}}
        }"#;
        let config = HarvestConfig::from_json(json).unwrap();
        assert_eq!(config.queries.len(), 2);
        assert_eq!(config.queries[0].file.as_deref(), Some("music.jsonl"));
        assert_eq!(config.queries[1].file, None);
        assert_eq!(config.min_text_len, 50);
        assert_eq!(config.pauses.fetch, Delay::none());
        // Unspecified pause fields keep their defaults
        assert_eq!(config.pauses.search, default_search_pause());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = HarvestConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, HarvestError::Config(_)));
    }

    #[test]
    fn test_result_page_url_pagination() {
        let engines = default_engines();

        let bing = &engines[1];
        assert_eq!(
            bing.result_page_url("Romani language dialects", 2, 10),
            "https://www.bing.com/search?q=Romani+language+dialects&first=20"
        );

        let yandex = &engines[2];
        assert_eq!(
            yandex.result_page_url("a&b", 2, 10),
            "https://yandex.com/search/?text=a%26b&p=2"
        );
    }

    #[test]
    fn test_delay_sample_within_bounds() {
        let delay = Delay::new(10, 20);
        for _ in 0..50 {
            let ms = delay.sample().as_millis() as u64;
            assert!((10..=20).contains(&ms));
        }

        // Reversed bounds are tolerated
        let reversed = Delay::new(20, 10);
        let ms = reversed.sample().as_millis() as u64;
        assert!((10..=20).contains(&ms));

        assert!(Delay::none().sample().is_zero());
    }

    #[test]
    fn test_ready_state_timeout_capped_by_page_load() {
        let config = HarvestConfig {
            page_load_timeout_secs: 3,
            ready_state_timeout_secs: 5,
            ..HarvestConfig::default()
        };
        assert_eq!(config.ready_state_timeout(), Duration::from_secs(3));
    }
}
