//! Headline and link extraction from portal listing pages.
//!
//! Selector groups are a prioritized fallback chain: the first group that
//! matches at least one element ends the search for its phase, even when the
//! length filter then discards every match. Link selectors run first; only
//! if they produce no items at all does the headline-selector phase run,
//! yielding items without URLs.

use crate::portals::PortalConfig;
use crate::utils::normalize_whitespace;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

/// Headlines shorter than this (after whitespace collapsing) are navigation
/// labels and section names, not stories.
const MIN_HEADLINE_LEN: usize = 10;

/// Stage-1 cap: only the first this-many raw matches are considered, to keep
/// the headline listing responsive. Batch callers pass `None` to
/// [`extract_headlines`] instead.
pub const STAGE_ONE_CAP: usize = 20;

/// A headline candidate produced during stage-1 extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub headline: String,
    /// Absolute URL resolved against the page base; `None` when the item
    /// came from the linkless headline phase.
    pub url: Option<Url>,
}

/// Extract `(headline, url)` candidates from a fetched listing page.
///
/// `cap` limits how many raw element matches are considered per winning
/// group. An empty result is a valid "no content found" outcome, not an
/// error.
pub fn extract_headlines(
    doc: &Html,
    config: &PortalConfig,
    base_url: &Url,
    cap: Option<usize>,
) -> Vec<NewsItem> {
    let mut items = collect_phase(doc, config.link_selectors, cap, |el| {
        el.value()
            .attr("href")
            .and_then(|href| base_url.join(href).ok())
    });

    if items.is_empty() {
        items = collect_phase(doc, config.headline_selectors, cap, |_| None);
        // The headline phase never has anchors, so keep everything.
        return items;
    }

    // Items from the link phase must carry a URL. Duplicates stay: the
    // emitted sequence mirrors the document.
    items.into_iter().filter(|item| item.url.is_some()).collect()
}

/// Run one selector phase: try groups in declared order, stop at the first
/// group with >= 1 raw match, then filter and map its elements.
fn collect_phase(
    doc: &Html,
    selectors: &[&str],
    cap: Option<usize>,
    mut resolve_url: impl FnMut(&ElementRef<'_>) -> Option<Url>,
) -> Vec<NewsItem> {
    for css in selectors {
        let selector = match Selector::parse(css) {
            Ok(s) => s,
            Err(e) => {
                warn!(selector = css, error = %e, "Unparseable selector; skipping");
                continue;
            }
        };

        let matched: Vec<ElementRef<'_>> = match cap {
            Some(n) => doc.select(&selector).take(n).collect(),
            None => doc.select(&selector).collect(),
        };
        if matched.is_empty() {
            continue;
        }
        debug!(selector = css, count = matched.len(), "Selector group matched");

        // This group wins the phase outright. Even if the length filter
        // drops every match, later groups are not consulted.
        return matched
            .into_iter()
            .filter_map(|el| {
                let headline = normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "));
                // Characters, not bytes: Bangla headlines are three bytes
                // per character.
                if headline.chars().count() <= MIN_HEADLINE_LEN {
                    return None;
                }
                let url = resolve_url(&el);
                Some(NewsItem { headline, url })
            })
            .collect();
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portals::config_for;

    fn base() -> Url {
        Url::parse("https://example.com/news/").unwrap()
    }

    fn extract(html: &str, cap: Option<usize>) -> Vec<NewsItem> {
        let doc = Html::parse_document(html);
        let config = config_for(&base());
        extract_headlines(&doc, config, &base(), cap)
    }

    #[test]
    fn test_first_matching_group_wins() {
        // Default config tries "h1 a" before "h2 a"; both match here, so
        // only the h1 items may appear.
        let html = r#"
            <h1><a href="/story/1">Headline from the first group</a></h1>
            <h2><a href="/story/2">Headline from the second group</a></h2>
        "#;
        let items = extract(html, None);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].headline, "Headline from the first group");
        assert_eq!(
            items[0].url.as_ref().unwrap().as_str(),
            "https://example.com/story/1"
        );
    }

    #[test]
    fn test_short_headlines_are_discarded() {
        let html = r#"
            <h1><a href="/a">Breaking</a></h1>
            <h1><a href="/b">Breaking News Today</a></h1>
        "#;
        let items = extract(html, None);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].headline, "Breaking News Today");
    }

    #[test]
    fn test_matched_group_with_only_short_text_still_ends_phase() {
        // "h1 a" matches but its only text fails the length filter. The
        // group still wins the link phase, so "h2 a" is never consulted; in
        // the headline phase "h1" wins the same way. Net result: nothing,
        // even though the h2 held a perfectly good story link.
        let html = r#"
            <h1><a href="/a">Short</a></h1>
            <h2><a href="/b">A perfectly long headline over here</a></h2>
        "#;
        assert!(extract(html, None).is_empty());
    }

    #[test]
    fn test_headline_phase_when_no_links_match() {
        let html = r#"
            <h2>First linkless headline of the day</h2>
            <h2>Second linkless headline of the day</h2>
        "#;
        let items = extract(html, None);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.url.is_none()));
    }

    #[test]
    fn test_empty_document_yields_empty_sequence() {
        assert!(extract("<html><body><p>nothing here</p></body></html>", None).is_empty());
    }

    #[test]
    fn test_relative_hrefs_resolve_against_base() {
        let html = r#"<h1><a href="world/story-77">Relative link headline text</a></h1>"#;
        let items = extract(html, None);
        assert_eq!(
            items[0].url.as_ref().unwrap().as_str(),
            "https://example.com/news/world/story-77"
        );
    }

    #[test]
    fn test_cap_limits_raw_matches() {
        let mut html = String::new();
        for i in 0..30 {
            html.push_str(&format!(
                "<h1><a href=\"/s/{i}\">Numbered headline number {i} here</a></h1>"
            ));
        }
        let items = extract(&html, Some(STAGE_ONE_CAP));
        assert_eq!(items.len(), STAGE_ONE_CAP);
    }

    #[test]
    fn test_duplicate_urls_are_preserved_in_order() {
        // The same story linked from two cards stays listed twice.
        let html = r#"
            <h1><a href="/same">First copy of the shared headline</a></h1>
            <h1><a href="/same">Second copy of the shared headline</a></h1>
        "#;
        let items = extract(html, None);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].headline, "First copy of the shared headline");
        assert_eq!(items[1].headline, "Second copy of the shared headline");
    }

    #[test]
    fn test_length_filter_counts_chars_not_bytes() {
        // Eight Bangla characters span 24 bytes; the filter must still
        // treat this as a short navigation label.
        let html = r#"<h1><a href="/bd">বাংলাদেশ</a></h1>"#;
        assert!(extract(html, None).is_empty());

        let long = r#"<h1><a href="/bd">বাংলাদেশে বন্যা পরিস্থিতির অবনতি</a></h1>"#;
        assert_eq!(extract(long, None).len(), 1);
    }

    #[test]
    fn test_exactly_ten_chars_is_discarded() {
        // The filter is strictly greater-than 10.
        let html = r#"<h1><a href="/t">aaaaaaaaaa</a></h1>"#;
        assert!(extract(html, None).is_empty());

        let html11 = r#"<h1><a href="/t">aaaaaaaaaaa</a></h1>"#;
        assert_eq!(extract(html11, None).len(), 1);
    }
}
