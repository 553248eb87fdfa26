//! URL classification: decide whether a URL denotes a YouTube video, a
//! single news article, or a portal listing page.
//!
//! Classification happens once, before any network traffic, and the decision
//! is fixed for the lifetime of the scraped entry.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What kind of content a scraped entry holds.
///
/// `Manual` never comes out of [`classify`]; it marks raw text the user
/// pasted straight into the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Youtube,
    Article,
    Portal,
    Manual,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContentType::Youtube => "youtube",
            ContentType::Article => "article",
            ContentType::Portal => "portal",
            ContentType::Manual => "manual",
        };
        write!(f, "{s}")
    }
}

/// The classifier's verdict for a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A recognized YouTube URL, with the extracted 11-character video id.
    Youtube { video_id: String },
    /// A page that looks like a single news story.
    Article,
    /// A listing/index page with multiple headline links.
    Portal,
}

impl Classification {
    pub fn content_type(&self) -> ContentType {
        match self {
            Classification::Youtube { .. } => ContentType::Youtube,
            Classification::Article => ContentType::Article,
            Classification::Portal => ContentType::Portal,
        }
    }
}

static YOUTUBE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([a-zA-Z0-9_-]{11})")
            .unwrap(),
        Regex::new(r"youtube\.com/v/([a-zA-Z0-9_-]{11})").unwrap(),
    ]
});

/// Extract a YouTube video id from any of the recognized URL shapes
/// (`watch?v=`, `youtu.be/`, `embed/`, `v/`).
pub fn extract_video_id(url: &str) -> Option<String> {
    for pattern in YOUTUBE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(url) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// Heuristic: does the URL point at a single article rather than a listing?
///
/// Walks the slash-trimmed URL in reverse. A digit seen before any of
/// `/ ? #` means the last path segment embeds a number, which single-article
/// URLs conventionally do.
///
/// Known limitation, kept on purpose: any listing whose URL happens to end
/// in a digit (a paginated index like `/news?page=2`) misclassifies as an
/// article.
pub fn is_single_article_url(url: &str) -> bool {
    for ch in url.trim_matches('/').chars().rev() {
        if ch.is_ascii_digit() {
            return true;
        }
        if matches!(ch, '/' | '?' | '#') {
            break;
        }
    }
    false
}

/// Classify a URL as YouTube video, single article, or portal listing.
pub fn classify(url: &str) -> Classification {
    if let Some(video_id) = extract_video_id(url) {
        return Classification::Youtube { video_id };
    }
    if is_single_article_url(url) {
        Classification::Article
    } else {
        Classification::Portal
    }
}
