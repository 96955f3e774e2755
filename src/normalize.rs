//! Free-text gap canonicalization
//!
//! Converts a raw gap statement plus its article category into a stable
//! canonical key, so that "no mention of API rate limits" and "API rate
//! limits are not documented" merge into one gap. Normalization is a pure
//! function with no hidden state: identical input always yields the same
//! key. When no stable subject can be extracted, the record falls back to
//! a hashed key and is flagged low-confidence rather than dropped.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{AuditError, Result};
use crate::record::Category;

/// Boilerplate prefixes stripped from the front of a gap statement.
///
/// Ordered longest-first so that more specific phrasings win over their
/// shorter substrings.
const BOILERPLATE_PREFIXES: &[&str] = &[
    "this article does not mention",
    "this article does not cover",
    "this article does not explain",
    "this article does not document",
    "the article does not mention",
    "the article does not cover",
    "the article does not explain",
    "the article does not document",
    "does not mention",
    "does not cover",
    "does not explain",
    "does not document",
    "no mention of",
    "no coverage of",
    "no documentation for",
    "no documentation of",
    "absence of",
    "lack of",
    "lacks",
    "missing",
    "unclear",
];

/// Boilerplate suffixes stripped from the end of a gap statement.
const BOILERPLATE_SUFFIXES: &[&str] = &[
    "are not clearly defined",
    "is not clearly defined",
    "are not clearly explained",
    "is not clearly explained",
    "are not documented",
    "is not documented",
    "are not mentioned",
    "is not mentioned",
    "are not covered",
    "is not covered",
    "are not explained",
    "is not explained",
    "are not defined",
    "is not defined",
    "are missing",
    "is missing",
    "not documented",
    "not covered",
    "not mentioned",
];

/// Filler words trimmed from the edges of the extracted subject.
const EDGE_FILLERS: &[&str] = &["the", "a", "an", "of", "for", "about", "on", "to", "any"];

/// Minimum subject length (in characters) for a confident canonical key.
const MIN_SUBJECT_LEN: usize = 3;

/// A normalized gap concept
///
/// Many `ArticleGapRecord`s may map to one `CanonicalGap`. The key embeds
/// the category slug, so identical subjects in different categories never
/// collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalGap {
    /// Stable merge key: `<category-slug>::<subject-slug>`
    pub canonical_key: String,
    /// Human-readable label for the gap concept
    pub display_label: String,
    /// Category the key is scoped to
    pub category: Category,
    /// True when the hashed fallback key was used instead of an extracted
    /// subject
    pub low_confidence: bool,
}

/// Normalize a raw gap statement into a canonical gap
///
/// Case-insensitive, whitespace-collapsing, boilerplate-stripping. Empty or
/// whitespace-only input is a malformed record; callers skip and log it.
pub fn normalize(raw_gap_text: &str, category: Category) -> Result<CanonicalGap> {
    let collapsed = collapse_whitespace(&raw_gap_text.to_lowercase());
    if collapsed.is_empty() {
        return Err(AuditError::MalformedRecord(
            "empty raw_gap_text".to_string(),
        ));
    }

    let subject = extract_subject(&collapsed);

    if subject.len() < MIN_SUBJECT_LEN {
        // Fallback: hash the collapsed raw text so the record still merges
        // with byte-identical statements instead of being dropped.
        let digest = Sha256::digest(collapsed.as_bytes());
        let short = hex_prefix(&digest, 8);
        return Ok(CanonicalGap {
            canonical_key: format!("{}::raw-{}", category.slug(), short),
            display_label: capitalize(&collapsed),
            category,
            low_confidence: true,
        });
    }

    let slug = subject
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");

    Ok(CanonicalGap {
        canonical_key: format!("{}::{}", category.slug(), slug),
        display_label: capitalize(&subject),
        category,
        low_confidence: false,
    })
}

/// Strip boilerplate phrasing and edge fillers, keeping the semantic subject
fn extract_subject(collapsed: &str) -> String {
    let mut text = collapsed.to_string();

    // Strip phrases until no prefix or suffix matches anymore; statements
    // like "missing: no mention of error codes" stack boilerplate.
    loop {
        let before = text.len();

        for prefix in BOILERPLATE_PREFIXES {
            if let Some(rest) = text.strip_prefix(prefix) {
                text = rest.trim_start_matches([' ', ':', ',', '-']).to_string();
            }
        }
        for suffix in BOILERPLATE_SUFFIXES {
            if let Some(rest) = text.strip_suffix(suffix) {
                text = rest.trim_end_matches([' ', ':', ',', '-']).to_string();
            }
        }

        if text.len() == before {
            break;
        }
    }

    // Keep only word characters so punctuation variants collide.
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut start = 0;
    let mut end = words.len();
    while start < end && EDGE_FILLERS.contains(&words[start]) {
        start += 1;
    }
    while end > start && EDGE_FILLERS.contains(&words[end - 1]) {
        end -= 1;
    }

    words[start..end].join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn hex_prefix(bytes: &[u8], take: usize) -> String {
    bytes
        .iter()
        .take(take)
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_is_pure() {
        let a = normalize("No mention of API rate limits", Category::Api).unwrap();
        let b = normalize("No mention of API rate limits", Category::Api).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_equivalent_phrasings_share_key() {
        let a = normalize("no mention of API rate limits", Category::Api).unwrap();
        let b = normalize("API rate limits are not documented", Category::Api).unwrap();
        let c = normalize("This article does not mention api rate limits", Category::Api).unwrap();

        assert_eq!(a.canonical_key, b.canonical_key);
        assert_eq!(b.canonical_key, c.canonical_key);
        assert_eq!(a.canonical_key, "api::api-rate-limits");
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let a = normalize("Missing   Error Code Table", Category::Api).unwrap();
        let b = normalize("missing error code table", Category::Api).unwrap();
        assert_eq!(a.canonical_key, b.canonical_key);
        assert_eq!(a.canonical_key, "api::error-code-table");
    }

    #[test]
    fn test_categories_never_collide() {
        let api = normalize("missing error codes", Category::Api).unwrap();
        let general = normalize("missing error codes", Category::General).unwrap();
        assert_ne!(api.canonical_key, general.canonical_key);
    }

    #[test]
    fn test_edge_fillers_trimmed() {
        let a = normalize("lacks any examples for the API", Category::Api).unwrap();
        let b = normalize("missing examples for the api", Category::Api).unwrap();
        assert_eq!(a.canonical_key, b.canonical_key);
        assert_eq!(a.canonical_key, "api::examples-for-the-api");
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert!(normalize("", Category::General).is_err());
        assert!(normalize("   \t ", Category::General).is_err());
    }

    #[test]
    fn test_pure_boilerplate_falls_back_to_hashed_key() {
        // Nothing survives stripping, so the hashed fallback kicks in.
        let gap = normalize("missing", Category::General).unwrap();
        assert!(gap.low_confidence);
        assert!(gap.canonical_key.starts_with("general::raw-"));
    }

    #[test]
    fn test_hashed_fallback_is_stable() {
        let a = normalize("missing", Category::General).unwrap();
        let b = normalize("missing", Category::General).unwrap();
        assert_eq!(a.canonical_key, b.canonical_key);
    }

    #[test]
    fn test_display_label_is_capitalized_subject() {
        let gap = normalize("no mention of webhook retries", Category::Integrations).unwrap();
        assert_eq!(gap.display_label, "Webhook retries");
        assert!(!gap.low_confidence);
    }

    #[test]
    fn test_punctuation_variants_collide() {
        let a = normalize("missing error-code table", Category::Api).unwrap();
        let b = normalize("missing error code table", Category::Api).unwrap();
        assert_eq!(a.canonical_key, b.canonical_key);
    }

    #[test]
    fn test_stacked_boilerplate_stripped_to_fixpoint() {
        let gap = normalize("missing: no mention of error codes", Category::Api).unwrap();
        assert_eq!(gap.canonical_key, "api::error-codes");
    }
}
