//! # Sentimental Scope
//!
//! A content extraction and analysis pipeline that takes an arbitrary URL,
//! works out what it points at (news portal listing, single article, or
//! YouTube video), scrapes it into a two-stage headline-then-content
//! workflow, and runs sentiment analysis and summarization over the result.
//!
//! ## Pipeline
//!
//! 1. **Classify**: a URL is a YouTube video (recognized URL shapes), a
//!    single article (numeric id in the last path segment), or a portal
//!    listing (everything else).
//! 2. **Stage 1**: extract headline candidates with per-portal selector
//!    configs, falling back through selector groups and then a generic
//!    default; persist them headline-only.
//! 3. **Stage 2**: on selection, fetch the full article body (generic
//!    paragraph-density extraction) or the video transcript (best caption
//!    track by language preference, segmented into timestamped paragraphs).
//! 4. **Analyze**: sentiment + summary through an OpenAI-compatible
//!    endpoint, with neutral fallbacks whenever the service misbehaves.
//!
//! Extraction failures are typed values surfaced as user-facing messages;
//! the analysis collaborator is allowed to fail without sinking the
//! pipeline.

pub mod analysis;
pub mod classify;
pub mod cli;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod portals;
pub mod store;
pub mod utils;

pub use classify::{Classification, ContentType, classify};
pub use error::{Result, ScrapeError};
pub use fetch::PageFetcher;
pub use store::ContentStore;
