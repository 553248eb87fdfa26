//! Binary entry point: scrape a URL into the two-stage store, optionally
//! promote everything to full content, analyze it, and emit a JSON report.

use clap::Parser;
use sentimental_scope::analysis::AnalysisClient;
use sentimental_scope::cli::Cli;
use sentimental_scope::pipeline::{
    self, AnalyzedContent, fetch_all_full_content, scrape_headlines,
};
use sentimental_scope::store::{ContentStore, StorageLevel, StoredRecord};
use sentimental_scope::{PageFetcher, ScrapeError};
use serde::Serialize;
use std::error::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

/// Everything one run produces, serialized as the JSON report.
#[derive(Debug, Serialize)]
struct ScrapeReport {
    source_url: String,
    content_type: String,
    headlines: Vec<StoredRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    analyses: Vec<AnalyzedContent>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();

    let fetcher = PageFetcher::new()?;
    let analysis = args.api_url.as_ref().filter(|_| !args.no_analysis).map(|url| {
        AnalysisClient::new(fetcher.client().clone(), url.clone(), args.api_key.clone())
    });

    // --- Manual mode: analyze pasted text, no scraping or storage ---
    if let Some(text) = &args.manual {
        let Some(analysis) = &analysis else {
            error!("Manual mode needs an analysis endpoint (--api-url or ANALYSIS_API_URL)");
            return Err(
                ScrapeError::Analysis("no analysis endpoint configured".into()).into(),
            );
        };
        let result = pipeline::analyze_manual(analysis, text).await;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    // --- Stage 1: classify and scrape headlines ---
    let url = pipeline::normalize_url(args.url.as_deref().unwrap_or_default());
    info!(%url, "Scraping");

    let outcome = match scrape_headlines(&fetcher, &url).await {
        Ok(outcome) => outcome,
        Err(e) => {
            // Extraction failures are reportable outcomes, not crashes.
            error!(error = %e, "Scrape failed");
            return Err(e.into());
        }
    };
    if outcome.entries.is_empty() {
        warn!("No articles found on this page; try a different URL");
        return Ok(());
    }

    let store = ContentStore::new();
    let ids = store.save_headlines_only(outcome.content_type, outcome.entries, &url);
    info!(count = ids.len(), content_type = %outcome.content_type, "Saved headlines");

    // --- Stage 2 (optional): promote everything to full content ---
    if args.full {
        let fetched = fetch_all_full_content(&fetcher, &store).await;
        info!(fetched, "Full content fetched");
    }

    // --- Analysis over every promoted record ---
    let mut analyses = Vec::new();
    if let Some(analysis) = &analysis {
        for record in store.headlines() {
            if record.storage_level != StorageLevel::FullContent {
                continue;
            }
            match pipeline::build_analysis(&store, analysis, record.id).await {
                Ok(analyzed) => analyses.push(analyzed),
                Err(e) => warn!(id = record.id, error = %e, "Skipping analysis"),
            }
        }
        info!(count = analyses.len(), "Analysis complete");
    }

    // --- Report ---
    let report = ScrapeReport {
        source_url: url,
        content_type: outcome.content_type.to_string(),
        headlines: store.headlines(),
        analyses,
    };

    match &args.json_output_dir {
        Some(dir) => {
            tokio::fs::create_dir_all(dir).await?;
            let date = chrono::Local::now().format("%Y-%m-%d_%H%M%S");
            let path = format!("{}/scrape_{date}.json", dir.trim_end_matches('/'));
            tokio::fs::write(&path, serde_json::to_string_pretty(&report)?).await?;
            info!(%path, "Wrote JSON report");
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(())
}
