/// Number of leading characters that identify a text block
pub const FINGERPRINT_CHARS: usize = 200;

/// Collapses every whitespace run to a single space and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Length in characters, which is what the minimum length is measured in
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Duplicate-detection key: the first [`FINGERPRINT_CHARS`] characters
pub fn fingerprint(text: &str) -> &str {
    match text.char_indices().nth(FINGERPRINT_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Normalizes `raw` and returns it only if it meets `min_len`
pub fn qualifying_block(raw: &str, min_len: usize) -> Option<String> {
    let text = normalize_whitespace(raw);
    if text.is_empty() || char_len(&text) < min_len {
        None
    } else {
        Some(text)
    }
}
