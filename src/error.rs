//! Typed errors for the scraping and analysis pipeline.
//!
//! Extraction failures are ordinary values handed back to the caller, which
//! turns them into user-facing messages. Nothing in this crate panics on a
//! bad URL, an unreachable site, or a video without captions.

use thiserror::Error;

/// The failure taxonomy of the extraction pipeline.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The fetch failed in transport or returned a non-success status.
    #[error("error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// Selectors or the content model matched nothing usable.
    #[error("could not extract content from {url}")]
    NoContent { url: String },

    /// The video has no caption tracks, or transcript retrieval failed.
    #[error("could not extract transcript: {0}")]
    NoTranscript(String),

    /// The URL could not be parsed or has an unrecognized shape.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The downstream text-analysis service failed. The analysis layer
    /// absorbs this into a fallback result; only its retry internals ever
    /// hold one of these.
    #[error("analysis service error: {0}")]
    Analysis(String),
}

impl ScrapeError {
    pub fn network(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn no_content(url: impl Into<String>) -> Self {
        Self::NoContent { url: url.into() }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_no_content(&self) -> bool {
        matches!(self, Self::NoContent { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_message() {
        let e = ScrapeError::network("https://example.com", "connection refused");
        assert_eq!(
            e.to_string(),
            "error fetching https://example.com: connection refused"
        );
        assert!(e.is_network());
    }

    #[test]
    fn test_no_content_message() {
        let e = ScrapeError::no_content("https://example.com/story");
        assert!(e.to_string().contains("could not extract content"));
        assert!(e.is_no_content());
    }
}
