//! Per-portal selector configuration.
//!
//! Each known news domain maps to ordered lists of CSS selectors for
//! headlines, headline links, and article bodies. The registry is a flat
//! ordered table so adding a portal is additive data, not new branching
//! code. Unknown domains fall back to a generic tag/class-based default.

use url::Url;

/// Selector configuration for one portal (or the default).
///
/// Each list is tried strictly in order and the first selector yielding at
/// least one match wins; matches are never merged across selectors.
#[derive(Debug)]
pub struct PortalConfig {
    pub headline_selectors: &'static [&'static str],
    pub link_selectors: &'static [&'static str],
    pub article_content_selectors: &'static [&'static str],
}

/// Known portals in declaration order. Keys match by substring containment
/// against the lowercased host, so `bbc.com` covers `www.bbc.com` and any
/// other subdomain.
static PORTAL_TABLE: &[(&str, PortalConfig)] = &[
    (
        "bbc.com",
        PortalConfig {
            headline_selectors: &[
                "h2[data-testid=\"card-headline\"]",
                "h3[data-testid=\"card-headline\"]",
                "h2",
                "h3.gs-c-promo-heading__title",
            ],
            link_selectors: &[
                "a[data-testid=\"internal-link\"]",
                "h2[data-testid=\"card-headline\"] a",
                "h3[data-testid=\"card-headline\"] a",
            ],
            article_content_selectors: &[
                "[data-component=\"text-block\"] p",
                "div[data-component=\"text-block\"]",
                ".story-body p",
                "article p",
            ],
        },
    ),
    (
        "prothomalo.com",
        PortalConfig {
            headline_selectors: &[
                "h1.headline",
                "h2.headline",
                "h3.story_title",
                ".title a",
                "h2",
                "h3",
            ],
            link_selectors: &[".title a", ".story_title a", "h2 a", "h3 a"],
            article_content_selectors: &[
                ".story_content p",
                ".news_content p",
                "article p",
                ".content p",
            ],
        },
    ),
    (
        "thedailystar.net",
        PortalConfig {
            headline_selectors: &[
                "h2.title",
                "h3.title",
                ".article-title",
                ".news-title",
                ".story-title",
                "h2",
                "h3",
            ],
            link_selectors: &[
                ".title a",
                ".article-title a",
                ".news-title a",
                "h2 a",
                "h3 a",
                "a[href*=\"/news/\"]",
                "a[href*=\"/article/\"]",
            ],
            article_content_selectors: &[
                ".article-content p",
                ".news-content p",
                ".story-content p",
                ".content-body p",
                "article p",
                ".content p",
            ],
        },
    ),
    (
        "cnn.com",
        PortalConfig {
            headline_selectors: &[
                "h3.cd__headline",
                ".cd__headline",
                "h2.headline",
                "h3.headline",
                ".card-media__headline",
                ".article-title",
                "h2",
                "h3",
            ],
            link_selectors: &[
                ".cd__headline a",
                "h3.cd__headline a",
                ".card-media__headline a",
                "a[data-link-type=\"article\"]",
                "h2 a",
                "h3 a",
                "a[href*=\"/2024/\"]",
                "a[href*=\"/2025/\"]",
            ],
            article_content_selectors: &[
                ".article__content p",
                ".zn-body__paragraph",
                "div[data-module=\"ArticleBody\"] p",
                ".pg-rail-tall__body p",
                "article p",
                ".content p",
            ],
        },
    ),
    (
        "news24bd.tv",
        PortalConfig {
            headline_selectors: &[
                ".news-title",
                ".article-title",
                ".post-title",
                "h2.title",
                "h3.title",
                ".headline",
                "h2",
                "h3",
            ],
            link_selectors: &[
                ".news-title a",
                ".article-title a",
                ".post-title a",
                "h2.title a",
                "h3.title a",
                ".headline a",
                "h2 a",
                "h3 a",
                "a[href*=\"/news/\"]",
            ],
            article_content_selectors: &[
                ".news-content p",
                ".article-content p",
                ".post-content p",
                ".story-content p",
                ".content-body p",
                "article p",
                ".content p",
            ],
        },
    ),
];

/// Generic fallback for domains with no dedicated entry.
static DEFAULT_CONFIG: PortalConfig = PortalConfig {
    headline_selectors: &[
        "h1",
        "h2",
        "h3",
        ".headline",
        ".title",
        "[class*=\"headline\"]",
        "[class*=\"title\"]",
    ],
    link_selectors: &[
        "h1 a",
        "h2 a",
        "h3 a",
        ".headline a",
        ".title a",
        "article a",
    ],
    article_content_selectors: &[
        "article p",
        ".content p",
        ".article-content p",
        ".post-content p",
        ".entry-content p",
        ".story-content p",
        ".news-content p",
    ],
};

/// Look up the selector configuration for a URL's host.
///
/// Returns the first table entry whose key is contained in the lowercased
/// host, or the default config when none matches (or the URL has no host).
pub fn config_for(url: &Url) -> &'static PortalConfig {
    let Some(host) = url.host_str() else {
        return &DEFAULT_CONFIG;
    };
    let host = host.to_lowercase();
    for (key, config) in PORTAL_TABLE {
        if host.contains(key) {
            return config;
        }
    }
    &DEFAULT_CONFIG
}
