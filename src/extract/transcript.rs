//! YouTube transcript retrieval and paragraph segmentation.
//!
//! Retrieval walks the watch page for the player's caption track list,
//! picks the best track by a fixed language preference (Bangla variants
//! first, then English variants, else whatever the page lists first), and
//! fetches the track's timedtext XML.
//!
//! Segmentation groups caption lines into paragraphs with a dual threshold:
//! a boundary closes the open paragraph when more than 120 seconds have
//! elapsed since the previous boundary OR the paragraph has accumulated 10
//! lines, whichever triggers first. Each closed paragraph is stamped
//! `[MM:SS]` from the start offset of the LAST line it contains, and the
//! trailing flush is stamped with the final caption's offset. That stamping
//! choice is preserved recorded behavior; keep it for compatibility with
//! previously stored transcripts.

use crate::error::{Result, ScrapeError};
use crate::fetch::PageFetcher;
use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Track language preference, most preferred first.
const PREFERRED_LANGUAGES: &[&str] = &["bn", "bn-BD", "en", "en-US", "en-GB"];

/// Elapsed seconds since the last boundary that force a new paragraph.
const PARAGRAPH_GAP_SECS: f64 = 120.0;

/// Caption line count that forces a new paragraph.
const PARAGRAPH_MAX_LINES: usize = 10;

/// One timed caption line as delivered by the timedtext endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLine {
    /// Start offset in seconds.
    pub start: f64,
    pub text: String,
}

/// A transcript paragraph: `[MM:SS]` stamp plus space-joined caption text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptParagraph {
    pub timestamp: String,
    pub paragraph: String,
}

/// One available caption track from the watch page's player response.
#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
}

static CAPTION_TRACKS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""captionTracks":(\[.*?\])"#).unwrap());

/// Fetch the best-available transcript for a video and segment it into
/// timestamped paragraphs.
#[instrument(level = "info", skip(fetcher))]
pub async fn get_transcript(
    fetcher: &PageFetcher,
    video_id: &str,
) -> Result<Vec<TranscriptParagraph>> {
    let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
    let page = fetcher.fetch_text(&watch_url).await?;

    let tracks = parse_caption_tracks(&page)?;
    let track = select_track(&tracks)
        .ok_or_else(|| ScrapeError::NoTranscript("No transcripts available for this video".into()))?;
    info!(language = %track.language_code, "Selected caption track");

    let xml = fetcher.fetch_text(&track.base_url).await?;
    let lines = parse_timedtext(&xml)?;
    if lines.is_empty() {
        return Err(ScrapeError::NoTranscript(
            "Caption track contained no lines".into(),
        ));
    }
    debug!(count = lines.len(), "Fetched caption lines");

    Ok(paragraphize(&lines))
}

/// Pull the caption track list out of the watch page's embedded player JSON.
fn parse_caption_tracks(page: &str) -> Result<Vec<CaptionTrack>> {
    let Some(caps) = CAPTION_TRACKS_RE.captures(page) else {
        return Err(ScrapeError::NoTranscript(
            "No transcripts available for this video".into(),
        ));
    };
    serde_json::from_str(&caps[1])
        .map_err(|e| ScrapeError::NoTranscript(format!("Malformed caption track list: {e}")))
}

/// Pick the first track matching the language preference order, falling back
/// to the first listed track rather than failing.
fn select_track<'t>(tracks: &'t [CaptionTrack]) -> Option<&'t CaptionTrack> {
    for lang in PREFERRED_LANGUAGES {
        if let Some(track) = tracks.iter().find(|t| t.language_code == *lang) {
            return Some(track);
        }
    }
    tracks.first()
}

/// Parse timedtext XML (`<text start="12.3" dur="1.5">…</text>`) into
/// caption lines. Entity and character references inside caption text
/// arrive as separate reference events and are resolved here.
fn parse_timedtext(xml: &str) -> Result<Vec<CaptionLine>> {
    let mut reader = Reader::from_str(xml);

    let mut lines = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"text" => {
                current_start = None;
                current_text.clear();
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"start" {
                        if let Ok(value) = attr.unescape_value() {
                            current_start = value.parse::<f64>().ok();
                        }
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if current_start.is_some() {
                    let text = t
                        .decode()
                        .map_err(|e| ScrapeError::NoTranscript(format!("Bad caption text: {e}")))?;
                    current_text.push_str(&text);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if current_start.is_some() {
                    let resolved = e
                        .resolve_char_ref()
                        .map_err(|e| ScrapeError::NoTranscript(format!("Bad caption text: {e}")))?;
                    if let Some(ch) = resolved {
                        current_text.push(ch);
                    } else if let Ok(name) = e.decode() {
                        // Predefined XML entities; anything else is dropped.
                        match name.as_ref() {
                            "amp" => current_text.push('&'),
                            "lt" => current_text.push('<'),
                            "gt" => current_text.push('>'),
                            "quot" => current_text.push('"'),
                            "apos" => current_text.push('\''),
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"text" => {
                if let Some(start) = current_start.take() {
                    let text = current_text.trim().to_string();
                    if !text.is_empty() {
                        lines.push(CaptionLine { start, text });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ScrapeError::NoTranscript(format!(
                    "Could not parse timedtext XML: {e}"
                )));
            }
            _ => {}
        }
    }
    Ok(lines)
}

/// Format a start offset as `[MM:SS]`.
fn format_timestamp(start: f64) -> String {
    let minutes = (start / 60.0) as u64;
    let seconds = (start % 60.0) as u64;
    format!("[{minutes:02}:{seconds:02}]")
}

/// Group caption lines into paragraphs by the dual gap/line-count threshold.
pub fn paragraphize(lines: &[CaptionLine]) -> Vec<TranscriptParagraph> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut last_boundary = 0.0_f64;

    for line in lines {
        current.push(line.text.trim());

        if line.start - last_boundary > PARAGRAPH_GAP_SECS || current.len() >= PARAGRAPH_MAX_LINES {
            paragraphs.push(TranscriptParagraph {
                // Stamped from the line that closed the paragraph, i.e. the
                // last line it contains.
                timestamp: format_timestamp(line.start),
                paragraph: current.join(" "),
            });
            current.clear();
            last_boundary = line.start;
        }
    }

    if !current.is_empty() {
        if let Some(final_line) = lines.last() {
            paragraphs.push(TranscriptParagraph {
                timestamp: format_timestamp(final_line.start),
                paragraph: current.join(" "),
            });
        }
    }

    paragraphs
}
