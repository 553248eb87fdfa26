//! Generic single-article content extraction.
//!
//! Unlike the portal listing path, this module knows nothing about specific
//! sites. It isolates the main readable block by paragraph density: group
//! every `<p>` under its parent element, score each parent by text mass
//! penalized by link text (navigation and related-story boxes are
//! link-heavy), and take the best-scoring parent's paragraphs as the body.
//! The headline comes from `og:title`, the first `<h1>`, or `<title>`.
//!
//! The result is one text block whose first line is the headline and whose
//! remainder is the body, mirroring what a caller would get from any generic
//! main-content extractor.

use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::utils::normalize_whitespace;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Paragraphs shorter than this are bylines, captions, and timestamps;
/// they never decide which container wins.
const MIN_PARAGRAPH_LEN: usize = 25;

/// A parent must accumulate at least this much paragraph text to count as
/// article body at all.
const MIN_BODY_SCORE: i64 = 60;

static P_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static A_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static H1_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static OG_TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property=\"og:title\"]").unwrap());

/// Extracted article text: first line is the headline, the rest is body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleText {
    pub headline: String,
    pub body: String,
}

/// Download a page and extract `(headline, body)` from it.
///
/// Returns `Ok(None)` when the page fetched fine but no readable main
/// content was found; the caller reports "could not extract content" rather
/// than treating it as a fault.
#[instrument(level = "info", skip(fetcher))]
pub async fn extract_article(fetcher: &PageFetcher, url: &str) -> Result<Option<ArticleText>> {
    let html = fetcher.fetch_text(url).await?;
    Ok(extract_from_html(&html))
}

/// Extract `(headline, body)` from raw HTML.
pub fn extract_from_html(html: &str) -> Option<ArticleText> {
    let doc = Html::parse_document(html);
    let body = best_body(&doc)?;
    let headline = find_headline(&doc).unwrap_or_else(|| first_line(&body));

    // Match the downstream contract: a single text block split at the first
    // newline. If the body's first paragraph repeats the headline, drop it.
    let body = match body.split_once('\n') {
        Some((first, rest)) if normalize_whitespace(first) == headline => rest.trim().to_string(),
        _ => body,
    };

    Some(ArticleText { headline, body })
}

fn first_line(body: &str) -> String {
    body.lines().next().unwrap_or_default().trim().to_string()
}

/// Score every `<p>` parent and return the winning container's paragraphs
/// joined with newlines.
fn best_body(doc: &Html) -> Option<String> {
    // Keyed by the parent's node id; scores keep document order separately
    // so ties and iteration order stay deterministic.
    let mut texts: HashMap<ego_tree::NodeId, Vec<String>> = HashMap::new();
    let mut scores: Vec<(ego_tree::NodeId, i64)> = Vec::new();

    for p in doc.select(&P_SELECTOR) {
        let Some(parent) = p.parent() else { continue };
        let text = normalize_whitespace(&p.text().collect::<Vec<_>>().join(" "));
        if text.is_empty() {
            continue;
        }

        let link_len: usize = p
            .select(&A_SELECTOR)
            .map(|a| normalize_whitespace(&a.text().collect::<Vec<_>>().join(" ")).len())
            .sum();

        // Short or link-dominated paragraphs carry no weight but still
        // travel with their container if it wins.
        let weight = if text.len() >= MIN_PARAGRAPH_LEN {
            text.len() as i64 - 2 * link_len as i64
        } else {
            0
        };

        let id = parent.id();
        match scores.iter_mut().find(|(sid, _)| *sid == id) {
            Some((_, score)) => *score += weight,
            None => scores.push((id, weight)),
        }
        texts.entry(id).or_default().push(text);
    }

    let (winner, score) = scores
        .into_iter()
        .max_by_key(|(_, score)| *score)
        .filter(|(_, score)| *score >= MIN_BODY_SCORE)?;
    debug!(score, "Selected main content container");

    Some(texts.remove(&winner)?.join("\n"))
}

/// Headline preference: `og:title` meta, then the first `<h1>`, then
/// `<title>`.
fn find_headline(doc: &Html) -> Option<String> {
    if let Some(meta) = doc.select(&OG_TITLE_SELECTOR).next() {
        if let Some(content) = meta.value().attr("content") {
            let title = normalize_whitespace(content);
            if !title.is_empty() {
                return Some(title);
            }
        }
    }
    for sel in [&*H1_SELECTOR, &*TITLE_SELECTOR] {
        if let Some(el) = doc.select(sel).next() {
            let title = normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "));
            if !title.is_empty() {
                return Some(title);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_HTML: &str = r#"
        <html>
        <head><title>Site Name | Flood waters recede in the delta</title></head>
        <body>
            <nav>
                <p><a href="/home">Home</a> <a href="/news">News</a> <a href="/sport">Sport and leisure coverage</a></p>
            </nav>
            <h1>Flood waters recede in the delta</h1>
            <article>
                <p>Flood waters began receding across the southern delta on Tuesday
                   after three days of continuous rainfall that displaced thousands
                   of residents from low-lying villages.</p>
                <p>Relief agencies said supply boats reached the worst-hit districts
                   by early afternoon, carrying drinking water and dry food for an
                   estimated twelve thousand people.</p>
                <p>Officials expect river levels to return to normal within a week
                   if the dry spell holds, though embankment repairs will take far
                   longer to complete.</p>
            </article>
            <footer><p>© Example Media. <a href="/about">About this site</a></p></footer>
        </body>
        </html>
    "#;

    #[test]
    fn test_extracts_main_content_over_navigation() {
        let result = extract_from_html(ARTICLE_HTML).unwrap();
        assert!(result.body.contains("Flood waters began receding"));
        assert!(result.body.contains("embankment repairs"));
        assert!(!result.body.contains("Sport and leisure"));
        assert!(!result.body.contains("Example Media"));
    }

    #[test]
    fn test_headline_prefers_h1_over_title_tag() {
        let result = extract_from_html(ARTICLE_HTML).unwrap();
        assert_eq!(result.headline, "Flood waters recede in the delta");
    }

    #[test]
    fn test_og_title_wins_when_present() {
        let html = r#"
            <html><head>
                <meta property="og:title" content="The canonical headline">
                <title>Something noisier</title>
            </head><body>
                <h1>The on-page variant</h1>
                <div>
                    <p>Enough body text to clear the scoring threshold for the
                       container holding these two paragraphs of content.</p>
                    <p>A second paragraph keeps the winning score comfortably
                       above the minimum required for a real article body.</p>
                </div>
            </body></html>
        "#;
        let result = extract_from_html(html).unwrap();
        assert_eq!(result.headline, "The canonical headline");
    }

    #[test]
    fn test_empty_page_yields_none() {
        assert!(extract_from_html("<html><body></body></html>").is_none());
    }

    #[test]
    fn test_link_farm_yields_none() {
        // Every paragraph is pure links; nothing should qualify as body.
        let html = r#"
            <div>
                <p><a href="/1">First related story link with plenty of text</a></p>
                <p><a href="/2">Second related story link with plenty of text</a></p>
                <p><a href="/3">Third related story link with plenty of text</a></p>
            </div>
        "#;
        assert!(extract_from_html(html).is_none());
    }

    #[test]
    fn test_headline_duplicated_as_first_paragraph_is_dropped_from_body() {
        let html = r#"
            <h1>Exact repeated headline text</h1>
            <div>
                <p>Exact repeated headline text</p>
                <p>The actual story begins here with enough words to make the
                   container score clear the extraction threshold easily.</p>
            </div>
        "#;
        let result = extract_from_html(html).unwrap();
        assert_eq!(result.headline, "Exact repeated headline text");
        assert!(result.body.starts_with("The actual story begins"));
    }
}
