pub mod config;
pub mod crawlers;
pub mod decode;
pub mod error;
pub mod filter;
pub mod harvest;
pub mod parsers;
pub mod results;
pub mod sink;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{HarvestConfig, QuerySpec};
pub use error::HarvestError;
pub use harvest::Harvester;
pub use results::HarvestSummary;

use crawlers::fetch::PageFetcher;
use crawlers::http::HttpTransport;
use crawlers::search::SearchClient;
use crawlers::web::WebDriverSession;
use filter::{UrlFilter, UrlFilterConfig};
use std::path::PathBuf;

/// Main builder for a search-and-harvest run
pub struct Harvest {
    config: HarvestConfig,
}

impl Harvest {
    /// Create a new Harvest builder from a loaded configuration
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Set the directory the JSONL files are written to
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = output_dir.into();
        self
    }

    pub fn with_webdriver_url(mut self, webdriver_url: &str) -> Self {
        self.config.webdriver_url = webdriver_url.to_string();
        self
    }

    /// Set how many result pages are requested from each engine
    pub fn with_pages(mut self, pages: usize) -> Self {
        self.config.pages_per_engine = pages;
        self
    }

    /// Set the cap on discovered URLs per query
    pub fn with_max_urls(mut self, max_urls: usize) -> Self {
        self.config.max_urls_per_query = max_urls;
        self
    }

    /// Set the minimum length (in characters) of an extracted block
    pub fn with_min_text_len(mut self, min_text_len: usize) -> Self {
        self.config.min_text_len = min_text_len;
        self
    }

    pub fn with_provenance(mut self, record_provenance: bool) -> Self {
        self.config.record_provenance = record_provenance;
        self
    }

    /// Add a query to run after those already configured
    pub fn with_query(mut self, query: QuerySpec) -> Self {
        self.config.queries.push(query);
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Run every configured query through one browser session.
    ///
    /// The session is closed whether or not the harvest succeeds.
    pub async fn run(self) -> Result<HarvestSummary, HarvestError> {
        let config = &self.config;
        if config.queries.is_empty() {
            return Err(HarvestError::Config("no queries configured".to_string()));
        }

        let filter = UrlFilter::new(UrlFilterConfig {
            skip_extensions: config.skip_extensions.clone(),
            exclude_patterns: config.exclude_patterns.clone(),
        })?;
        let transport = HttpTransport::new(&config.user_agent, config.http_timeout())?;

        let session = WebDriverSession::connect(config).await?;
        let search = SearchClient::new(
            &session,
            &config.engines,
            &filter,
            config.pauses,
            config.results_per_page,
        );
        let fetcher = PageFetcher::new(
            &session,
            transport,
            config.ready_state_timeout(),
            config.pauses.settle,
        );

        let result = Harvester::new(config, &filter, search, fetcher)
            .run(&config.queries)
            .await;
        session.close().await;
        result
    }
}
