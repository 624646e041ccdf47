use crate::config::{HarvestConfig, QuerySpec};
use crate::crawlers::crawler::{Discover, Fetch};
use crate::error::HarvestError;
use crate::filter::UrlFilter;
use crate::parsers::TextExtractor;
use crate::results::{HarvestSummary, ProvenanceRecord, TextRecord};
use crate::sink::JsonlSink;
use crate::utils::{claim_unique_filename, output_filename};
use std::collections::HashSet;

/// Combined outputs shared by every query of a run
struct CombinedSinks {
    texts: Option<JsonlSink>,
    provenance: Option<JsonlSink>,
}

impl CombinedSinks {
    fn open(config: &HarvestConfig, taken: &mut HashSet<String>) -> Result<Self, HarvestError> {
        let mut open = |name: &Option<String>| -> Result<Option<JsonlSink>, HarvestError> {
            match name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => {
                    let name = claim_unique_filename(name, taken);
                    Ok(Some(JsonlSink::create(config.output_dir.join(name))?))
                }
                _ => Ok(None),
            }
        };
        Ok(Self {
            texts: open(&config.combined_texts_file)?,
            provenance: open(&config.combined_provenance_file)?,
        })
    }
}

/// Runs queries one after another: discover, fetch, extract, write
pub struct Harvester<'a, D: Discover, F: Fetch> {
    config: &'a HarvestConfig,
    filter: &'a UrlFilter,
    discover: D,
    fetch: F,
}

impl<'a, D: Discover, F: Fetch> Harvester<'a, D, F> {
    pub fn new(config: &'a HarvestConfig, filter: &'a UrlFilter, discover: D, fetch: F) -> Self {
        Self {
            config,
            filter,
            discover,
            fetch,
        }
    }

    /// Processes every query in order. Only output I/O failures abort the run.
    pub async fn run(&self, queries: &[QuerySpec]) -> Result<HarvestSummary, HarvestError> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        // Every file of a run gets its own name so no sink truncates another
        let mut taken = HashSet::new();
        let mut combined = CombinedSinks::open(self.config, &mut taken)?;
        let mut summary = HarvestSummary::default();

        for (index, spec) in queries.iter().enumerate() {
            ::log::info!(
                "[QUERY {}/{}] {}",
                index + 1,
                queries.len(),
                spec.query
            );
            self.run_query(spec, &mut combined, &mut taken, &mut summary)
                .await?;
            summary.queries += 1;
        }

        ::log::info!(
            "Harvest finished: {} queries, {} urls, {} pages, {} blocks",
            summary.queries,
            summary.urls_discovered,
            summary.pages_fetched,
            summary.blocks_written
        );
        Ok(summary)
    }

    async fn run_query(
        &self,
        spec: &QuerySpec,
        combined: &mut CombinedSinks,
        taken: &mut HashSet<String>,
        summary: &mut HarvestSummary,
    ) -> Result<(), HarvestError> {
        let requested = output_filename(spec);
        let filename = claim_unique_filename(&requested, taken);
        if filename != requested {
            ::log::warn!(
                "Output file {} already used in this run, writing \"{}\" to {}",
                requested,
                spec.query,
                filename
            );
        }
        let path = self.config.output_dir.join(filename);
        let mut sink = JsonlSink::create(&path)?;

        let urls = self
            .discover
            .discover_urls(
                &spec.query,
                self.config.pages_per_engine,
                self.config.max_urls_per_query,
            )
            .await;
        summary.urls_discovered += urls.len();

        // Fingerprints are per query: the same paragraph may appear under two queries
        let mut extractor =
            TextExtractor::with_tags(self.config.min_text_len, self.config.tags.clone());

        for url in &urls {
            if self.filter.has_skip_extension(url) {
                ::log::debug!("[SKIP] extension: {}", url);
                continue;
            }

            ::log::info!("[FETCH] {}", url);
            let html = self.fetch.fetch_html(url).await;
            if !html.is_empty() {
                summary.pages_fetched += 1;
                let blocks = extractor.extract(&html);
                ::log::debug!("{} blocks from {}", blocks.len(), url);

                for block in &blocks {
                    let text_record = TextRecord::from(block);
                    let provenance = ProvenanceRecord::new(&spec.query, block, url);
                    if self.config.record_provenance {
                        sink.write(&provenance)?;
                    } else {
                        sink.write(&text_record)?;
                    }
                    if let Some(texts) = combined.texts.as_mut() {
                        texts.write(&text_record)?;
                    }
                    if let Some(all) = combined.provenance.as_mut() {
                        all.write(&provenance)?;
                    }
                }
                summary.blocks_written += blocks.len();
            }

            self.config.pauses.fetch.pause().await;
        }

        ::log::info!(
            "Wrote {} blocks for \"{}\" to {}",
            sink.written(),
            spec.query,
            sink.path().display()
        );
        Ok(())
    }
}
