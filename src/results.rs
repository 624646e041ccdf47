use serde::{Deserialize, Serialize};

/// Raw HTML retrieved for one URL
#[derive(Debug, Clone)]
pub struct PageDocument {
    /// URL the HTML was retrieved from
    pub url: String,

    /// Page source, rendered or plain
    pub html: String,
}

impl PageDocument {
    pub fn new(url: &str, html: String) -> Self {
        Self {
            url: url.to_string(),
            html,
        }
    }
}

/// A normalized block of page text that met the minimum length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub text: String,
}

impl TextBlock {
    pub fn new(text: String) -> Self {
        Self { text }
    }
}

/// Line written to text-only outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    pub text: String,
}

/// Line written to provenance outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub query: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ProvenanceRecord {
    pub fn new(query: &str, block: &TextBlock, url: &str) -> Self {
        Self {
            query: query.to_string(),
            text: block.text.clone(),
            url: Some(url.to_string()),
        }
    }
}

impl From<&TextBlock> for TextRecord {
    fn from(block: &TextBlock) -> Self {
        Self {
            text: block.text.clone(),
        }
    }
}

/// Counters reported at the end of a harvest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestSummary {
    pub queries: usize,
    pub urls_discovered: usize,
    pub pages_fetched: usize,
    pub blocks_written: usize,
}
