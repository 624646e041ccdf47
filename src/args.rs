use clap::Parser;
use std::path::PathBuf;
use yield_text::{HarvestConfig, QuerySpec};

#[derive(Parser, Debug)]
#[command(name = "yield-text")]
#[command(about = "Searches several engines and harvests page text into JSONL files")]
#[command(version)]
pub struct Args {
    /// JSON configuration file (queries, engines, limits, delays)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Query to search for; may be given several times
    #[arg(short, long = "query")]
    pub queries: Vec<String>,

    /// Directory the JSONL files are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Result pages requested from each engine
    #[arg(long)]
    pub pages: Option<usize>,

    /// Maximum URLs fetched per query
    #[arg(long)]
    pub max_urls: Option<usize>,

    /// Minimum characters for a text block to be kept
    #[arg(long)]
    pub min_text_len: Option<usize>,

    /// WebDriver endpoint (the WEBDRIVER_URL environment variable takes precedence)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Write {query, text, url} records instead of text only
    #[arg(long)]
    pub provenance: bool,
}

impl Args {
    /// Applies command-line overrides on top of a loaded configuration
    pub fn apply(&self, mut config: HarvestConfig) -> HarvestConfig {
        config
            .queries
            .extend(self.queries.iter().map(|q| QuerySpec::new(q)));
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(pages) = self.pages {
            config.pages_per_engine = pages;
        }
        if let Some(max_urls) = self.max_urls {
            config.max_urls_per_query = max_urls;
        }
        if let Some(min_text_len) = self.min_text_len {
            config.min_text_len = min_text_len;
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        }
        if self.provenance {
            config.record_provenance = true;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_applied() {
        let args = Args::parse_from([
            "yield-text",
            "--query",
            "romani history",
            "-q",
            "romani music",
            "--pages",
            "1",
            "--min-text-len",
            "50",
            "--provenance",
        ]);
        let config = args.apply(HarvestConfig::default());

        let queries: Vec<&str> = config.queries.iter().map(|q| q.query.as_str()).collect();
        assert_eq!(queries, vec!["romani history", "romani music"]);
        assert_eq!(config.pages_per_engine, 1);
        assert_eq!(config.min_text_len, 50);
        assert_eq!(config.max_urls_per_query, 200);
        assert!(config.record_provenance);
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let args = Args::parse_from(["yield-text"]);
        let config = args.apply(HarvestConfig::default());
        assert!(config.queries.is_empty());
        assert_eq!(config.output_dir, PathBuf::from("scraped_content"));
        assert!(!config.record_provenance);
    }
}
