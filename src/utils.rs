use crate::config::QuerySpec;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Longest slug generated from a query
pub const MAX_SLUG_LEN: usize = 120;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z._\-]+").expect("valid filename pattern"));

/// Turns a query into a lowercase filename stem
pub fn slugify(text: &str, max_len: usize) -> String {
    let lowered = text.to_lowercase();
    let slug = UNSAFE_FILENAME_CHARS.replace_all(&lowered, "_");
    let truncated: String = slug.chars().take(max_len).collect();
    truncated.trim_matches('_').to_string()
}

/// Sanitizes a requested output filename and makes sure it ends in `.jsonl`.
///
/// Returns `None` for blank names.
pub fn ensure_jsonl_filename(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let with_ext = if name.to_lowercase().ends_with(".jsonl") {
        name.to_string()
    } else {
        format!("{}.jsonl", name)
    };
    Some(UNSAFE_FILENAME_CHARS.replace_all(&with_ext, "_").into_owned())
}

/// Output filename for a query: its explicit file if usable, else a slug
pub fn output_filename(spec: &QuerySpec) -> String {
    if let Some(name) = spec.file.as_deref().and_then(ensure_jsonl_filename) {
        return name;
    }

    let slug = slugify(&spec.query, MAX_SLUG_LEN);
    if slug.is_empty() {
        "query.jsonl".to_string()
    } else {
        format!("{}.jsonl", slug)
    }
}

/// Claims `name` in `taken`, adding a `_2`, `_3`, ... suffix before the
/// extension when it is already used. Comparison ignores case.
pub fn claim_unique_filename(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_lowercase()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    let mut n = 2;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{}_{}.{}", stem, n, ext),
            None => format!("{}_{}", stem, n),
        };
        if taken.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(
            slugify("Who invented the Romani Language?", MAX_SLUG_LEN),
            "who_invented_the_romani_language"
        );
        assert_eq!(slugify("  a -- b  ", MAX_SLUG_LEN), "a_--_b");
        assert_eq!(slugify("Roma, Sinti & Kale", 8), "roma_sin");
        assert_eq!(slugify("???", MAX_SLUG_LEN), "");
    }

    #[test]
    fn test_ensure_jsonl_filename() {
        assert_eq!(ensure_jsonl_filename("t.jsonl"), Some("t.jsonl".to_string()));
        assert_eq!(ensure_jsonl_filename("notes"), Some("notes.jsonl".to_string()));
        assert_eq!(ensure_jsonl_filename("Data.JSONL"), Some("Data.JSONL".to_string()));
        assert_eq!(
            ensure_jsonl_filename("../etc/pass wd"),
            Some(".._etc_pass_wd.jsonl".to_string())
        );
        assert_eq!(ensure_jsonl_filename("   "), None);
    }

    #[test]
    fn test_output_filename() {
        let explicit = QuerySpec::new("History of Roma migration").with_file("migration_history");
        assert_eq!(output_filename(&explicit), "migration_history.jsonl");

        let slugged = QuerySpec::new("History of Roma migration");
        assert_eq!(output_filename(&slugged), "history_of_roma_migration.jsonl");

        let blank_file = QuerySpec::new("Romani proverbs").with_file(" ");
        assert_eq!(output_filename(&blank_file), "romani_proverbs.jsonl");

        assert_eq!(output_filename(&QuerySpec::new("!!!")), "query.jsonl");
    }

    #[test]
    fn test_claim_unique_filename() {
        let mut taken = HashSet::new();
        assert_eq!(claim_unique_filename("texts_all.jsonl", &mut taken), "texts_all.jsonl");
        assert_eq!(claim_unique_filename("romani_music.jsonl", &mut taken), "romani_music.jsonl");
        assert_eq!(
            claim_unique_filename("Romani_Music.jsonl", &mut taken),
            "Romani_Music_2.jsonl"
        );
        assert_eq!(
            claim_unique_filename("romani_music.jsonl", &mut taken),
            "romani_music_3.jsonl"
        );
        assert_eq!(claim_unique_filename("texts_all.jsonl", &mut taken), "texts_all_2.jsonl");
        assert_eq!(claim_unique_filename("noext", &mut taken), "noext");
        assert_eq!(claim_unique_filename("noext", &mut taken), "noext_2");
    }
}
