use crate::config::default_skip_extensions;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

/// Configuration for deciding which discovered links may be fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlFilterConfig {
    /// File extensions (with leading dot) that are never fetched
    #[serde(default)]
    pub skip_extensions: Vec<String>,

    /// Regex patterns for URLs to exclude
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl Default for UrlFilterConfig {
    fn default() -> Self {
        Self {
            skip_extensions: default_skip_extensions(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Lexical URL safety checks. Never touches the network.
#[derive(Debug)]
pub struct UrlFilter {
    skip_extensions: Vec<String>,
    exclude_regexes: Vec<Regex>,
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self::new(UrlFilterConfig::default()).expect("Default filter has no regex patterns")
    }
}

impl UrlFilter {
    /// Create a new URL filter from configuration
    pub fn new(config: UrlFilterConfig) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        let skip_extensions = config
            .skip_extensions
            .iter()
            .map(|ext| {
                let ext = ext.trim().to_lowercase();
                if ext.starts_with('.') { ext } else { format!(".{}", ext) }
            })
            .collect();

        Ok(Self {
            skip_extensions,
            exclude_regexes,
        })
    }

    /// Determine if a discovered href is eligible to fetch
    pub fn is_fetchable(&self, href: &str) -> bool {
        let href = href.trim();
        if href.is_empty() {
            return false;
        }

        let lowered = href.to_ascii_lowercase();
        if lowered.starts_with("javascript:") || href.starts_with('/') {
            return false;
        }
        if !(lowered.starts_with("http://") || lowered.starts_with("https://")) {
            return false;
        }

        let url = match Url::parse(href) {
            Ok(url) => url,
            Err(_) => return false,
        };

        if is_internal_host(&url) {
            ::log::debug!("Filter rejected internal host: {}", href);
            return false;
        }
        if self.has_skip_extension(href) {
            ::log::debug!("Filter rejected binary/media url: {}", href);
            return false;
        }
        if self.exclude_regexes.iter().any(|re| re.is_match(href)) {
            ::log::debug!("Filter rejected by exclude pattern: {}", href);
            return false;
        }

        true
    }

    /// Whether the path (ignoring query and fragment) ends in a skip-listed extension
    pub fn has_skip_extension(&self, url: &str) -> bool {
        let path = url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        self.skip_extensions.iter().any(|ext| path.ends_with(ext))
    }
}

/// Whether the URL points at a local, loopback or private host.
/// Anything that cannot be parsed counts as internal.
pub fn is_local_or_internal(url: &str) -> bool {
    match Url::parse(url.trim()) {
        Ok(url) => is_internal_host(&url),
        Err(_) => true,
    }
}

fn is_internal_host(url: &Url) -> bool {
    match url.host() {
        None => true,
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost") || domain.ends_with(".local")
        }
        Some(Host::Ipv4(ip)) => is_internal_ipv4(ip),
        Some(Host::Ipv6(ip)) => is_internal_ipv6(ip),
    }
}

fn is_internal_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_internal_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_internal_ipv4(mapped);
    }
    // fc00::/7 unique local, fe80::/10 link local
    let first = ip.segments()[0];
    ip.is_loopback() || ip.is_unspecified() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
}
