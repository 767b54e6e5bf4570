//! Per-tab feature extraction.

use crate::models::TabSnapshot;
use crate::utils::urls;

/// Title tokens excluded from keywords.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "about",
];

/// Ordered category table; the first entry with a matching domain substring
/// wins, so more specific buckets must stay above broader ones.
const CATEGORY_PATTERNS: &[(&str, &[&str])] = &[
    (
        "social",
        &[
            "twitter.com",
            "facebook.com",
            "instagram.com",
            "linkedin.com",
            "reddit.com",
        ],
    ),
    ("video", &["youtube.com", "vimeo.com", "twitch.tv", "netflix.com"]),
    (
        "news",
        &["cnn.com", "bbc.com", "reuters.com", "nytimes.com", "theguardian.com"],
    ),
    ("shopping", &["amazon.com", "ebay.com", "etsy.com", "shopify.com"]),
    (
        "dev",
        &["github.com", "stackoverflow.com", "developer.mozilla.org", "docs."],
    ),
    ("docs", &["docs.google.com", "notion.so", "confluence.", "wiki."]),
    (
        "work",
        &["slack.com", "teams.microsoft.com", "zoom.us", "calendar.google.com"],
    ),
];

pub const GENERAL_CATEGORY: &str = "general";
pub const UNKNOWN_DOMAIN: &str = "other";

/// Derived attributes of one tab, used only during clustering.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    pub domain: String,
    pub path_tokens: Vec<String>,
    /// Lowercase title keywords, deduped, first-seen order, capped.
    pub keywords: Vec<String>,
    pub category: &'static str,
}

/// A malformed URL never aborts the pass; the tab lands in the
/// `other`/`general` bucket with its title keywords intact.
pub fn extract(tab: &TabSnapshot, max_keywords: usize) -> FeatureVector {
    match urls::host(&tab.url) {
        Some(domain) => FeatureVector {
            category: categorize(&domain),
            path_tokens: urls::path_tokens(&tab.url),
            keywords: title_keywords(&tab.title, max_keywords),
            domain,
        },
        None => FeatureVector {
            domain: UNKNOWN_DOMAIN.to_string(),
            path_tokens: Vec::new(),
            keywords: title_keywords(&tab.title, max_keywords),
            category: GENERAL_CATEGORY,
        },
    }
}

fn categorize(domain: &str) -> &'static str {
    for &(category, patterns) in CATEGORY_PATTERNS {
        if patterns.iter().any(|pattern| domain.contains(pattern)) {
            return category;
        }
    }
    GENERAL_CATEGORY
}

fn title_keywords(title: &str, cap: usize) -> Vec<String> {
    let lower = title.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();
    for token in lower.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
        if token.chars().count() <= 2 || STOP_WORDS.contains(&token) {
            continue;
        }
        if keywords.iter().any(|kept| kept == token) {
            continue;
        }
        keywords.push(token.to_string());
        if keywords.len() == cap {
            break;
        }
    }
    keywords
}
