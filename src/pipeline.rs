//! End-to-end orchestration of the two-stage browsing workflow.
//!
//! Stage 1: classify the entered URL, extract headline candidates, persist
//! them headline-only. Stage 2: when an item is selected, fetch its full
//! body or transcript and promote the stored record. The analysis view then
//! assembles the text block handed to the text-analysis collaborator.

use crate::analysis::{AnalysisClient, ChatAsk, ContentAnalysis};
use crate::classify::{Classification, ContentType, classify, extract_video_id};
use crate::error::{Result, ScrapeError};
use crate::extract::article::extract_article;
use crate::extract::headlines::{STAGE_ONE_CAP, extract_headlines};
use crate::extract::transcript::{TranscriptParagraph, get_transcript};
use crate::fetch::PageFetcher;
use crate::portals::config_for;
use crate::store::{ContentStore, FullContent, HeadlineEntry, StorageLevel};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, instrument, warn};
use url::Url;

/// Pause between consecutive full-content fetches in batch mode. A
/// politeness policy toward the target site, not a correctness requirement.
const BATCH_DELAY: Duration = Duration::from_secs(2);

/// Prepend `https://` when the user omitted the scheme.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Outcome of a stage-1 scrape: what the URL turned out to be and the
/// headline candidates found there.
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub content_type: ContentType,
    pub entries: Vec<HeadlineEntry>,
}

/// Stage 1: classify a normalized URL and extract headline candidates.
///
/// An empty `entries` list for a portal is a valid "nothing found there"
/// outcome, not an error. A single-article URL whose page yields no
/// readable content is an error, because there is nothing to list.
#[instrument(level = "info", skip(fetcher))]
pub async fn scrape_headlines(fetcher: &PageFetcher, url: &str) -> Result<ScrapeOutcome> {
    match classify(url) {
        Classification::Youtube { video_id } => {
            // Placeholder headline; the real transcript arrives in stage 2.
            info!(%video_id, "URL is a YouTube video");
            Ok(ScrapeOutcome {
                content_type: ContentType::Youtube,
                entries: vec![HeadlineEntry {
                    headline: format!("YouTube Video (ID: {video_id})"),
                    url: Some(url.to_string()),
                }],
            })
        }
        Classification::Article => {
            let article = extract_article(fetcher, url)
                .await?
                .ok_or_else(|| ScrapeError::no_content(url))?;
            info!(headline = %article.headline, "URL is a single article");
            Ok(ScrapeOutcome {
                content_type: ContentType::Article,
                entries: vec![HeadlineEntry {
                    headline: article.headline,
                    url: Some(url.to_string()),
                }],
            })
        }
        Classification::Portal => {
            let parsed =
                Url::parse(url).map_err(|e| ScrapeError::InvalidUrl(format!("{url}: {e}")))?;
            let doc = fetcher.fetch_page(url).await?;
            let config = config_for(&parsed);
            let items = extract_headlines(&doc, config, &parsed, Some(STAGE_ONE_CAP));
            info!(count = items.len(), "Portal scrape complete");
            Ok(ScrapeOutcome {
                content_type: ContentType::Portal,
                entries: items
                    .into_iter()
                    .map(|item| HeadlineEntry {
                        headline: item.headline,
                        url: item.url.map(|u| u.to_string()),
                    })
                    .collect(),
            })
        }
    }
}

/// Stage 2: fetch a stored record's full content and promote it in place.
///
/// Already-promoted records are left alone, so re-selecting an item is
/// cheap and idempotent.
#[instrument(level = "info", skip(fetcher, store))]
pub async fn fetch_full_content(
    fetcher: &PageFetcher,
    store: &ContentStore,
    id: u64,
) -> Result<()> {
    let record = store
        .get(id)
        .ok_or_else(|| ScrapeError::InvalidUrl(format!("no stored record with id {id}")))?;

    if record.storage_level == StorageLevel::FullContent {
        info!(id, "Record already holds full content");
        return Ok(());
    }

    match record.content_type {
        ContentType::Youtube => {
            let video_id = extract_video_id(&record.source_url).ok_or_else(|| {
                ScrapeError::InvalidUrl(format!("not a YouTube URL: {}", record.source_url))
            })?;
            let paragraphs = get_transcript(fetcher, &video_id).await?;
            store.update_with_full_content(id, FullContent::Transcript(paragraphs));
        }
        ContentType::Article | ContentType::Portal => {
            let article = extract_article(fetcher, &record.source_url)
                .await?
                .ok_or_else(|| ScrapeError::no_content(&record.source_url))?;
            store.update_with_full_content(id, FullContent::Body(article.body));
        }
        ContentType::Manual => {
            // Manual entries never reach the store via stage 1.
            return Err(ScrapeError::InvalidUrl(
                "manual entries have no content to fetch".into(),
            ));
        }
    }
    Ok(())
}

/// Batch mode: promote every headline-only record, pausing between
/// requests. Failures are logged and skipped so one dead link cannot sink
/// the batch.
pub async fn fetch_all_full_content(fetcher: &PageFetcher, store: &ContentStore) -> usize {
    let pending: Vec<u64> = store
        .headlines()
        .into_iter()
        .filter(|r| r.storage_level == StorageLevel::HeadlineOnly)
        .map(|r| r.id)
        .collect();

    let mut fetched = 0usize;
    for (i, id) in pending.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(BATCH_DELAY).await;
        }
        match fetch_full_content(fetcher, store, *id).await {
            Ok(()) => fetched += 1,
            Err(e) => warn!(id, error = %e, "Skipping record in batch fetch"),
        }
    }
    info!(fetched, total = pending.len(), "Batch full-content fetch complete");
    fetched
}

/// Structured content handed to the presentation layer, shaped by what was
/// scraped.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ContentData {
    Article {
        headline: String,
        content: String,
        word_count: usize,
    },
    Video {
        title: String,
        transcript_segments: Vec<TranscriptParagraph>,
        /// Seconds, parsed back from the last paragraph's `[MM:SS]` stamp.
        total_duration: u64,
    },
    Manual {
        text: String,
    },
}

/// Everything the presentation layer needs for one analyzed item.
#[derive(Debug, Serialize)]
pub struct AnalyzedContent {
    pub content_to_analyze: String,
    pub content_source: String,
    pub content_type: ContentType,
    pub content_data: ContentData,
    pub ai_analysis: ContentAnalysis,
}

/// Parse a `[MM:SS]` stamp back into seconds.
fn parse_timestamp_secs(stamp: &str) -> Option<u64> {
    let inner = stamp.strip_prefix('[')?.strip_suffix(']')?;
    let (m, s) = inner.split_once(':')?;
    Some(m.parse::<u64>().ok()? * 60 + s.parse::<u64>().ok()?)
}

/// Assemble the analysis view for a promoted record: build the text block,
/// run the analysis collaborator, and package the structured content.
#[instrument(level = "info", skip(store, analysis))]
pub async fn build_analysis<T: ChatAsk>(
    store: &ContentStore,
    analysis: &AnalysisClient<T>,
    id: u64,
) -> Result<AnalyzedContent> {
    let record = store
        .get(id)
        .ok_or_else(|| ScrapeError::InvalidUrl(format!("no stored record with id {id}")))?;

    match (&record.content_type, &record.transcript_data) {
        (ContentType::Youtube, Some(paragraphs)) => {
            let content_to_analyze = paragraphs
                .iter()
                .map(|p| format!("{} {}", p.timestamp, p.paragraph))
                .collect::<Vec<_>>()
                .join("\n\n");
            let total_duration = paragraphs
                .last()
                .and_then(|p| parse_timestamp_secs(&p.timestamp))
                .unwrap_or(0);
            let ai_analysis = analysis
                .analyze_content(&content_to_analyze, &record.headline)
                .await;
            Ok(AnalyzedContent {
                content_to_analyze,
                content_source: record.source_url.clone(),
                content_type: record.content_type,
                content_data: ContentData::Video {
                    title: record.headline,
                    transcript_segments: paragraphs.clone(),
                    total_duration,
                },
                ai_analysis,
            })
        }
        _ => {
            let Some(body) = record.full_content.as_deref() else {
                return Err(ScrapeError::no_content(&record.source_url));
            };
            let content_to_analyze = format!("{}\n\n{}", record.headline, body);
            let ai_analysis = analysis.analyze_content(body, &record.headline).await;
            Ok(AnalyzedContent {
                content_to_analyze,
                content_source: record.source_url.clone(),
                content_type: record.content_type,
                content_data: ContentData::Article {
                    headline: record.headline.clone(),
                    content: body.to_string(),
                    word_count: crate::utils::word_count(body),
                },
                ai_analysis,
            })
        }
    }
}

/// Analyze text the user pasted directly, bypassing scraping and storage.
pub async fn analyze_manual<T: ChatAsk>(
    analysis: &AnalysisClient<T>,
    text: &str,
) -> AnalyzedContent {
    let ai_analysis = analysis.analyze_content(text, "").await;
    AnalyzedContent {
        content_to_analyze: text.to_string(),
        content_source: text.to_string(),
        content_type: ContentType::Manual,
        content_data: ContentData::Manual {
            text: text.to_string(),
        },
        ai_analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisClient;
    use crate::error::ScrapeError;
    use crate::store::{ContentStore, FullContent, HeadlineEntry};

    struct NeverAsk;

    impl ChatAsk for NeverAsk {
        async fn ask(&self, _: &str, _: &str, _: u32, _: f64) -> crate::error::Result<String> {
            Err(ScrapeError::Analysis("offline".into()))
        }
    }

    fn offline_client() -> AnalysisClient<NeverAsk> {
        AnalysisClient::with_backend(NeverAsk)
    }

    #[test]
    fn test_normalize_url_prepends_scheme() {
        assert_eq!(normalize_url("example.com/news"), "https://example.com/news");
        assert_eq!(normalize_url("  bbc.com "), "https://bbc.com");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_parse_timestamp_secs() {
        assert_eq!(parse_timestamp_secs("[02:15]"), Some(135));
        assert_eq!(parse_timestamp_secs("[00:00]"), Some(0));
        assert_eq!(parse_timestamp_secs("02:15"), None);
        assert_eq!(parse_timestamp_secs("[xx:15]"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_build_analysis_article_view() {
        let store = ContentStore::new();
        let ids = store.save_headlines_only(
            ContentType::Article,
            vec![HeadlineEntry {
                headline: "Delta floods recede at last".into(),
                url: Some("https://example.com/story-9".into()),
            }],
            "https://example.com/story-9",
        );
        store.update_with_full_content(
            ids[0],
            FullContent::Body("Waters fell across the region. Crews began repairs.".into()),
        );

        let out = build_analysis(&store, &offline_client(), ids[0]).await.unwrap();
        assert_eq!(out.content_type, ContentType::Article);
        assert!(out.content_to_analyze.starts_with("Delta floods recede at last\n\n"));
        match out.content_data {
            ContentData::Article { word_count, .. } => assert_eq!(word_count, 8),
            _ => panic!("expected article content data"),
        }
        // Offline collaborator still produces a usable analysis.
        assert_eq!(out.ai_analysis.sentiment.unwrap().label, "neutral");
    }

    #[tokio::test(start_paused = true)]
    async fn test_build_analysis_video_view() {
        let store = ContentStore::new();
        let ids = store.save_headlines_only(
            ContentType::Youtube,
            vec![HeadlineEntry {
                headline: "YouTube Video (ID: dQw4w9WgXcQ)".into(),
                url: Some("https://youtu.be/dQw4w9WgXcQ".into()),
            }],
            "https://youtu.be/dQw4w9WgXcQ",
        );
        store.update_with_full_content(
            ids[0],
            FullContent::Transcript(vec![
                TranscriptParagraph {
                    timestamp: "[01:30]".into(),
                    paragraph: "first block".into(),
                },
                TranscriptParagraph {
                    timestamp: "[03:45]".into(),
                    paragraph: "second block".into(),
                },
            ]),
        );

        let out = build_analysis(&store, &offline_client(), ids[0]).await.unwrap();
        assert_eq!(
            out.content_to_analyze,
            "[01:30] first block\n\n[03:45] second block"
        );
        match out.content_data {
            ContentData::Video { total_duration, transcript_segments, .. } => {
                assert_eq!(total_duration, 225);
                assert_eq!(transcript_segments.len(), 2);
            }
            _ => panic!("expected video content data"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_build_analysis_requires_full_content() {
        let store = ContentStore::new();
        let ids = store.save_headlines_only(
            ContentType::Article,
            vec![HeadlineEntry {
                headline: "Still headline-only story".into(),
                url: Some("https://example.com/s/3".into()),
            }],
            "https://example.com/s/3",
        );
        let err = build_analysis(&store, &offline_client(), ids[0]).await.unwrap_err();
        assert!(err.is_no_content());
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_manual_text() {
        let out = analyze_manual(&offline_client(), "Just some pasted text to look at.").await;
        assert_eq!(out.content_type, ContentType::Manual);
        assert_eq!(out.content_source, "Just some pasted text to look at.");
        assert!(out.ai_analysis.summary.is_some());
    }
}
