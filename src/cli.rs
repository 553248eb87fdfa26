//! Command-line interface definitions.
//!
//! All options can be provided via flags; the analysis endpoint and key also
//! read from the environment so credentials stay out of shell history.

use clap::Parser;

/// Command-line arguments for the scraper pipeline.
///
/// # Examples
///
/// ```sh
/// # Stage 1 only: list headlines found at a URL
/// sentimental_scope bbc.com/news
///
/// # Fetch every listed item's full content and analyze it
/// sentimental_scope bbc.com/news --full -j ./json
///
/// # Analyze pasted text directly, no scraping
/// sentimental_scope --manual "Some text to analyze"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// URL to scrape (news portal, single article, or YouTube video).
    /// `https://` is assumed when the scheme is omitted.
    #[arg(required_unless_present = "manual")]
    pub url: Option<String>,

    /// Analyze this text directly instead of scraping a URL
    #[arg(long, conflicts_with = "url")]
    pub manual: Option<String>,

    /// Fetch full content for every scraped headline (stage 2 batch mode)
    #[arg(short, long)]
    pub full: bool,

    /// Output directory for the JSON results file; omit to print to stdout
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// OpenAI-compatible chat completions endpoint for sentiment/summary
    #[arg(long, env = "ANALYSIS_API_URL")]
    pub api_url: Option<String>,

    /// API key for the analysis endpoint
    #[arg(long, env = "ANALYSIS_API_KEY", default_value = "")]
    pub api_key: String,

    /// Skip sentiment analysis and summarization
    #[arg(long)]
    pub no_analysis: bool,
}
