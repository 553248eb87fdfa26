//! Two-stage content store.
//!
//! Stage 1 persists headline-only records straight from a scrape; stage 2
//! updates a record in place with the full body or transcript once the user
//! selects it. The store is the single owner of persisted records: the
//! extractors only ever produce transient values that callers hand over
//! here. Writes are serialized per store, and the stage transition is
//! last-write-wins and idempotent aside from `viewed_at`.

use crate::classify::ContentType;
use crate::extract::transcript::TranscriptParagraph;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, info};

/// How much of a record has been fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageLevel {
    HeadlineOnly,
    FullContent,
}

/// A persisted scraped item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: u64,
    pub content_type: ContentType,
    pub storage_level: StorageLevel,
    pub headline: String,
    /// Where the full content lives (the item's own link, or the original
    /// URL when the item had none).
    pub source_url: String,
    /// The URL the user originally entered.
    pub original_url: String,
    pub full_content: Option<String>,
    pub transcript_data: Option<Vec<TranscriptParagraph>>,
    pub scraped_at: DateTime<Local>,
    pub viewed_at: Option<DateTime<Local>>,
}

/// Stage-1 input: one headline candidate ready to persist.
#[derive(Debug, Clone)]
pub struct HeadlineEntry {
    pub headline: String,
    /// The item's own URL, if the extractor found one.
    pub url: Option<String>,
}

/// Stage-2 payload.
#[derive(Debug, Clone)]
pub enum FullContent {
    Body(String),
    Transcript(Vec<TranscriptParagraph>),
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    records: BTreeMap<u64, StoredRecord>,
}

/// In-process record store backing the two-stage browsing workflow.
#[derive(Debug, Default)]
pub struct ContentStore {
    inner: Mutex<Inner>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist stage-1 headline-only records and return their ids, in input
    /// order.
    pub fn save_headlines_only(
        &self,
        content_type: ContentType,
        entries: Vec<HeadlineEntry>,
        original_url: &str,
    ) -> Vec<u64> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = inner.next_id;
            inner.next_id += 1;
            inner.records.insert(
                id,
                StoredRecord {
                    id,
                    content_type,
                    storage_level: StorageLevel::HeadlineOnly,
                    headline: entry.headline,
                    source_url: entry.url.unwrap_or_else(|| original_url.to_string()),
                    original_url: original_url.to_string(),
                    full_content: None,
                    transcript_data: None,
                    scraped_at: Local::now(),
                    viewed_at: None,
                },
            );
            ids.push(id);
        }
        info!(count = ids.len(), %content_type, "Saved headline-only records");
        ids
    }

    /// Stage 2: attach full content to a record and mark it viewed.
    ///
    /// Last write wins; repeating the call with the same payload leaves the
    /// record indistinguishable apart from `viewed_at`. Returns `false` for
    /// an unknown id.
    pub fn update_with_full_content(&self, id: u64, content: FullContent) -> bool {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let Some(record) = inner.records.get_mut(&id) else {
            return false;
        };
        match content {
            FullContent::Body(body) => record.full_content = Some(body),
            FullContent::Transcript(paragraphs) => record.transcript_data = Some(paragraphs),
        }
        record.storage_level = StorageLevel::FullContent;
        record.viewed_at = Some(Local::now());
        debug!(id, "Record promoted to full content");
        true
    }

    /// All records, newest scrape first (insertion order reversed, so items
    /// from one scrape keep a stable relative order).
    pub fn headlines(&self) -> Vec<StoredRecord> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner.records.values().rev().cloned().collect()
    }

    pub fn get(&self, id: u64) -> Option<StoredRecord> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner.records.get(&id).cloned()
    }

    /// Drop every record (the user-initiated clear before a fresh scrape).
    /// Returns how many were deleted.
    pub fn clear(&self) -> usize {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let count = inner.records.len();
        inner.records.clear();
        info!(count, "Cleared stored records");
        count
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(headline: &str, url: Option<&str>) -> HeadlineEntry {
        HeadlineEntry {
            headline: headline.to_string(),
            url: url.map(str::to_string),
        }
    }

    #[test]
    fn test_save_headlines_assigns_sequential_ids() {
        let store = ContentStore::new();
        let ids = store.save_headlines_only(
            ContentType::Portal,
            vec![
                entry("First portal headline", Some("https://example.com/1")),
                entry("Second portal headline", None),
            ],
            "https://example.com/news",
        );
        assert_eq!(ids, vec![0, 1]);

        let second = store.get(1).unwrap();
        assert_eq!(second.storage_level, StorageLevel::HeadlineOnly);
        // Linkless items fall back to the originally entered URL.
        assert_eq!(second.source_url, "https://example.com/news");
        assert_eq!(second.original_url, "https://example.com/news");
        assert!(second.full_content.is_none());
        assert!(second.viewed_at.is_none());
    }

    #[test]
    fn test_stage_transition_sets_level_and_viewed_at() {
        let store = ContentStore::new();
        let ids = store.save_headlines_only(
            ContentType::Article,
            vec![entry("A single story headline", Some("https://example.com/s/1"))],
            "https://example.com/s/1",
        );
        assert!(store.update_with_full_content(ids[0], FullContent::Body("the body".into())));

        let record = store.get(ids[0]).unwrap();
        assert_eq!(record.storage_level, StorageLevel::FullContent);
        assert_eq!(record.full_content.as_deref(), Some("the body"));
        assert!(record.viewed_at.is_some());
    }

    #[test]
    fn test_stage_transition_is_idempotent_apart_from_viewed_at() {
        let store = ContentStore::new();
        let ids = store.save_headlines_only(
            ContentType::Article,
            vec![entry("A single story headline", Some("https://example.com/s/1"))],
            "https://example.com/s/1",
        );
        store.update_with_full_content(ids[0], FullContent::Body("same body".into()));
        let first = store.get(ids[0]).unwrap();
        store.update_with_full_content(ids[0], FullContent::Body("same body".into()));
        let second = store.get(ids[0]).unwrap();

        assert_eq!(first.full_content, second.full_content);
        assert_eq!(first.storage_level, second.storage_level);
        assert_eq!(first.headline, second.headline);
        assert_eq!(first.scraped_at, second.scraped_at);
    }

    #[test]
    fn test_update_unknown_id_returns_false() {
        let store = ContentStore::new();
        assert!(!store.update_with_full_content(42, FullContent::Body("x".into())));
    }

    #[test]
    fn test_transcript_payload() {
        let store = ContentStore::new();
        let ids = store.save_headlines_only(
            ContentType::Youtube,
            vec![entry("YouTube Video (ID: dQw4w9WgXcQ)", Some("https://youtu.be/dQw4w9WgXcQ"))],
            "https://youtu.be/dQw4w9WgXcQ",
        );
        let paragraphs = vec![TranscriptParagraph {
            timestamp: "[00:42]".into(),
            paragraph: "never gonna give".into(),
        }];
        store.update_with_full_content(ids[0], FullContent::Transcript(paragraphs.clone()));

        let record = store.get(ids[0]).unwrap();
        assert_eq!(record.transcript_data, Some(paragraphs));
        assert!(record.full_content.is_none());
    }

    #[test]
    fn test_headlines_listing_is_newest_first() {
        let store = ContentStore::new();
        store.save_headlines_only(
            ContentType::Portal,
            vec![entry("Older scrape headline", None)],
            "https://example.com/a",
        );
        store.save_headlines_only(
            ContentType::Portal,
            vec![entry("Newer scrape headline", None)],
            "https://example.com/b",
        );
        let listing = store.headlines();
        assert_eq!(listing[0].headline, "Newer scrape headline");
        assert_eq!(listing[1].headline, "Older scrape headline");
    }

    #[test]
    fn test_clear_returns_deleted_count() {
        let store = ContentStore::new();
        store.save_headlines_only(
            ContentType::Portal,
            vec![entry("Only headline present", None)],
            "https://example.com",
        );
        assert_eq!(store.clear(), 1);
        assert!(store.is_empty());
        assert_eq!(store.clear(), 0);
    }
}
