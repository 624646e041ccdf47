pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

use crate::results::TextBlock;
use scraper::Html;
use std::collections::HashSet;

/// Default content-bearing tags, scanned in this order
pub const DEFAULT_TAGS: [&str; 10] = ["h1", "h2", "h3", "h4", "p", "i", "em", "strong", "b", "li"];

/// Extracts qualifying text blocks from pages, remembering fingerprints
/// so that a block is emitted at most once across every page it sees
#[derive(Debug, Clone)]
pub struct TextExtractor {
    tags: Vec<String>,
    min_len: usize,
    seen: HashSet<String>,
}

impl TextExtractor {
    pub fn new(min_len: usize) -> Self {
        Self::with_tags(min_len, DEFAULT_TAGS.iter().map(|t| t.to_string()).collect())
    }

    pub fn with_tags(min_len: usize, tags: Vec<String>) -> Self {
        Self {
            tags,
            min_len,
            seen: HashSet::new(),
        }
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Number of distinct blocks emitted so far
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Extracts new blocks from one page.
    ///
    /// Falls back to the whole body text when no tagged element qualifies.
    pub fn extract(&mut self, html: &str) -> Vec<TextBlock> {
        let doc = Html::parse_document(html);
        let mut blocks = Vec::new();
        let mut qualified = false;

        for tag in &self.tags {
            for raw in html::tag_texts(&doc, tag) {
                if let Some(text) = text::qualifying_block(&raw, self.min_len) {
                    qualified = true;
                    if remember(&mut self.seen, &text) {
                        blocks.push(TextBlock::new(text));
                    }
                }
            }
        }

        if !qualified {
            if let Some(text) = text::qualifying_block(&html::body_text(&doc), self.min_len) {
                if remember(&mut self.seen, &text) {
                    ::log::debug!("No tagged block qualified, using body text");
                    blocks.push(TextBlock::new(text));
                }
            }
        }

        blocks
    }
}

/// Records the block's fingerprint; false if it was already present
fn remember(seen: &mut HashSet<String>, text: &str) -> bool {
    seen.insert(text::fingerprint(text).to_string())
}

/// Extracts text blocks from a single document
pub fn extract_text(html: &str, min_len: usize) -> Vec<String> {
    TextExtractor::new(min_len)
        .extract(html)
        .into_iter()
        .map(|block| block.text)
        .collect()
}
