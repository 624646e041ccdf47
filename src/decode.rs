//! Recovery of real destinations from search-engine tracking links.
//!
//! Engines wrap outbound links in redirects such as
//! `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com` or
//! `https://www.bing.com/ck/a?...&u=a1aHR0cHM6Ly9leGFtcGxlLmNvbQ`. The
//! destination is carried either percent-encoded or base64-encoded in a query
//! parameter or in the fragment.

use crate::error::DecodeError;
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use url::Url;

/// Query parameters known to carry the destination, in priority order
pub const WRAPPER_PARAMS: [&str; 8] = ["u", "uddg", "r", "ru", "q", "u1", "u2", "url"];

/// `base64("http")` prefix, present in any base64-encoded absolute URL
const BASE64_HTTP_SIGNATURE: &str = "aHR0";

static BASE64_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/=]+$").expect("valid base64 pattern"));

static U_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"u=([A-Za-z0-9_\-=%]+)").expect("valid u= pattern"));

static RELATIVE_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://wrapper.invalid/").expect("valid base url"));

const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Resolves a possibly wrapped href to the destination it encodes.
///
/// Returns the href unchanged when no candidate decodes to an http(s) URL.
pub fn resolve_real_url(href: &str) -> String {
    for candidate in collect_candidates(href) {
        match decode_candidate(&candidate) {
            Ok(url) => {
                ::log::trace!("Unwrapped {} -> {}", href, url);
                return url;
            }
            Err(e) => ::log::trace!("Wrapper candidate {:?} skipped: {}", candidate, e),
        }
    }
    href.to_string()
}

/// Candidate strings in the order they are tried
fn collect_candidates(href: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    let parsed = Url::parse(href).or_else(|_| RELATIVE_BASE.join(href));
    if let Ok(url) = parsed {
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        for param in WRAPPER_PARAMS {
            candidates.extend(
                pairs
                    .iter()
                    .filter(|(key, value)| key == param && !value.is_empty())
                    .map(|(_, value)| value.clone()),
            );
        }

        if let Some(fragment) = url.fragment() {
            if fragment.contains("http") || fragment.contains(BASE64_HTTP_SIGNATURE) {
                candidates.push(fragment.to_string());
            }
        }
    }

    if candidates.is_empty() {
        if let Some(token) = U_PARAM.captures(href).and_then(|caps| caps.get(1)) {
            candidates.push(percent_decode(token.as_str()).into_owned());
        }
    }

    candidates
}

/// Turns one candidate into an absolute http(s) URL
fn decode_candidate(candidate: &str) -> Result<String, DecodeError> {
    let decoded = percent_decode(candidate.trim());

    // A plain destination wins even if it carries base64 in its own query
    if decoded.starts_with("http://") || decoded.starts_with("https://") {
        return Ok(decoded.into_owned());
    }

    if looks_like_base64(&decoded) {
        return decode_base64_url(&decoded);
    }

    Err(DecodeError::NotHttp)
}

fn looks_like_base64(value: &str) -> bool {
    value.contains(BASE64_HTTP_SIGNATURE) || BASE64_LIKE.is_match(value)
}

/// Decodes a base64 token into an http URL.
///
/// Tokens may carry a short engine prefix (Bing uses `a1`) before the
/// encoded URL, so decoding is retried from the `aHR0` signature.
fn decode_base64_url(token: &str) -> Result<String, DecodeError> {
    let first = try_base64(token);
    if first.is_ok() {
        return first;
    }

    match token.find(BASE64_HTTP_SIGNATURE) {
        Some(offset) if offset > 0 => try_base64(&token[offset..]),
        _ => first,
    }
}

fn try_base64(token: &str) -> Result<String, DecodeError> {
    // URL-safe alphabet is folded onto the standard one; everything else is dropped
    let cleaned: String = token
        .chars()
        .filter_map(|c| match c {
            '-' => Some('+'),
            '_' => Some('/'),
            c if c.is_ascii_alphanumeric() || c == '+' || c == '/' => Some(c),
            _ => None,
        })
        .collect();
    if cleaned.is_empty() {
        return Err(DecodeError::NotBase64);
    }

    // A single dangling symbol can never decode; drop it
    let mut usable = cleaned.as_str();
    if usable.len() % 4 == 1 {
        usable = &usable[..usable.len() - 1];
    }
    let bytes = LENIENT_BASE64
        .decode(usable)
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;

    let text = String::from_utf8_lossy(&bytes);
    if text.starts_with("http") {
        Ok(text.trim_end_matches('\u{FFFD}').to_string())
    } else {
        Err(DecodeError::NotHttp)
    }
}

fn percent_decode(value: &str) -> Cow<'_, str> {
    urlencoding::decode(value).unwrap_or(Cow::Borrowed(value))
}
