//! Text analysis: sentiment and summarization through an OpenAI-compatible
//! chat endpoint.
//!
//! The pipeline treats this service as an opaque collaborator that is
//! allowed to fail. Transport errors, malformed replies, and replies that
//! break the score invariants are all absorbed here: callers always receive
//! a usable [`SentimentResult`] and [`SummaryResult`], falling back to a
//! neutral sentiment and a leading-sentences summary when the service
//! misbehaves.
//!
//! Transient failures are retried with exponential backoff and jitter
//! before the fallback kicks in.

use crate::error::{Result, ScrapeError};
use crate::utils::{truncate_for_log, word_count};
use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

const MAX_RETRIES: usize = 3;
const BASE_DELAY: Duration = Duration::from_secs(1);
const MAX_DELAY: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Inputs under this many trimmed chars are returned as their own summary.
const MIN_SUMMARIZABLE_LEN: usize = 50;

/// Average reading speed in words per minute, for the reading-time metric.
const READING_WPM: usize = 200;

/// Sentiment classification with per-class scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: String,
    pub confidence: f64,
    pub scores: SentimentScores,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl SentimentResult {
    /// The documented neutral fallback used whenever the service fails.
    pub fn fallback() -> Self {
        Self {
            label: "neutral".to_string(),
            confidence: 0.5,
            scores: SentimentScores {
                positive: 0.33,
                negative: 0.33,
                neutral: 0.34,
            },
        }
    }

    /// Scores must sum to 1.0 (±0.01) and the label must name the
    /// max-scoring class. Replies violating this are treated as malformed.
    fn is_valid(&self) -> bool {
        let s = &self.scores;
        let sum = s.positive + s.negative + s.neutral;
        if (sum - 1.0).abs() > 0.01 || !(0.0..=1.0).contains(&self.confidence) {
            return false;
        }
        let max = s.positive.max(s.negative).max(s.neutral);
        match self.label.as_str() {
            "positive" => s.positive == max,
            "negative" => s.negative == max,
            "neutral" => s.neutral == max,
            _ => false,
        }
    }
}

/// Summary plus word-count metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub original_length: usize,
    pub summary_length: usize,
    /// Summary word count divided by original word count, 2 decimals.
    pub compression_ratio: f64,
}

impl SummaryResult {
    fn from_summary(text: &str, summary: String) -> Self {
        let original_length = word_count(text);
        let summary_length = word_count(&summary);
        let compression_ratio = if original_length > 0 {
            round2(summary_length as f64 / original_length as f64)
        } else {
            1.0
        };
        Self {
            summary,
            original_length,
            summary_length,
            compression_ratio,
        }
    }

    /// Fallback: the text's leading sentences, up to `max_sentences`.
    fn fallback(text: &str, max_sentences: usize) -> Self {
        let summary = text
            .split('.')
            .filter(|s| !s.trim().is_empty())
            .take(max_sentences)
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(". ")
            + ".";
        Self::from_summary(text, summary)
    }
}

/// Content metrics reported alongside the per-tool results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetrics {
    pub word_count: usize,
    pub character_count: usize,
    /// Minutes at 200 wpm, at least 1.
    pub estimated_reading_time: usize,
}

/// Combined output of [`AnalysisClient::analyze_content`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub sentiment: Option<SentimentResult>,
    pub summary: Option<SummaryResult>,
    pub metrics: ContentMetrics,
    pub original_text_length: usize,
    pub analysis_timestamp: String,
}

/// One chat exchange with the model backend.
///
/// The trait seam exists so the retry decorator and the tests can stand in
/// for the HTTP client.
pub trait ChatAsk {
    async fn ask(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String>;
}

/// Decorator adding exponential backoff with jitter to any [`ChatAsk`].
///
/// Delay: `min(base * 2^(attempt-1), 30 s) + jitter(0..=250 ms)`.
pub struct RetryAsk<T> {
    inner: T,
    max_retries: usize,
    base_delay: Duration,
}

impl<T: ChatAsk> RetryAsk<T> {
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
        }
    }
}

impl<T: ChatAsk> ChatAsk for RetryAsk<T> {
    async fn ask(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String> {
        let mut attempt = 0usize;
        loop {
            match self.inner.ask(system, user, max_tokens, temperature).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        warn!(attempt, error = %e, "ask() exhausted retries");
                        return Err(e);
                    }
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > MAX_DELAY {
                        delay = MAX_DELAY;
                    }
                    let jitter_ms: u64 = rand::rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);
                    warn!(attempt, ?delay, error = %e, "ask() attempt failed; backing off");
                    sleep(delay).await;
                }
            }
        }
    }
}

/// HTTP backend speaking the OpenAI-compatible chat completions shape.
#[derive(Debug, Clone)]
pub struct HttpChat {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpChat {
    pub fn new(client: reqwest::Client, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }
}

impl ChatAsk for HttpChat {
    #[instrument(level = "debug", skip_all)]
    async fn ask(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String> {
        let payload = json!({
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ScrapeError::Analysis(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Analysis(format!("HTTP status {status}")));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScrapeError::Analysis(e.to_string()))?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ScrapeError::Analysis("reply missing message content".into()))?;
        Ok(content.trim().to_string())
    }
}

/// Client for the text-analysis collaborator.
pub struct AnalysisClient<T = HttpChat> {
    backend: RetryAsk<T>,
}

impl AnalysisClient<HttpChat> {
    /// Build a client against an OpenAI-compatible endpoint. The key is sent
    /// both as a bearer token and an `api-key` header so either server
    /// convention works.
    pub fn new(client: reqwest::Client, endpoint: String, api_key: String) -> Self {
        Self::with_backend(HttpChat::new(client, endpoint, api_key))
    }
}

impl<T: ChatAsk> AnalysisClient<T> {
    pub fn with_backend(backend: T) -> Self {
        Self {
            backend: RetryAsk::new(backend, MAX_RETRIES, BASE_DELAY),
        }
    }

    /// Classify sentiment. Never fails: transport errors, non-JSON replies,
    /// and replies breaking the score invariants all yield the neutral
    /// fallback.
    #[instrument(level = "info", skip_all, fields(chars = text.len()))]
    pub async fn analyze_sentiment(&self, text: &str) -> SentimentResult {
        let system =
            "You are an expert sentiment analysis AI. Respond only with valid JSON format as requested.";
        let user = format!(
            "Analyze the sentiment of the following text and respond with ONLY a JSON object \
             in this exact format:\n\
             {{\"label\": \"positive\" | \"negative\" | \"neutral\", \"confidence\": 0.85, \
             \"scores\": {{\"positive\": 0.15, \"negative\": 0.05, \"neutral\": 0.80}}}}\n\n\
             Rules: label is the dominant sentiment, confidence is between 0.0 and 1.0, \
             scores add up to 1.0.\n\nText: \"{text}\""
        );

        match self.backend.ask(system, &user, 200, 0.1).await {
            Ok(reply) => match serde_json::from_str::<SentimentResult>(strip_fences(&reply)) {
                Ok(result) if result.is_valid() => {
                    debug!(label = %result.label, "Sentiment analyzed");
                    result
                }
                Ok(_) => {
                    warn!("Sentiment reply violated score invariants; using fallback");
                    SentimentResult::fallback()
                }
                Err(e) => {
                    warn!(error = %e, reply = %truncate_for_log(&reply, 200),
                        "Sentiment reply was not valid JSON; using fallback");
                    SentimentResult::fallback()
                }
            },
            Err(e) => {
                warn!(error = %e, "Sentiment service unavailable; using fallback");
                SentimentResult::fallback()
            }
        }
    }

    /// Summarize to between `min_sentences` and `max_sentences` sentences.
    /// Never fails: very short input is its own summary, and service
    /// failures yield the leading-sentences fallback.
    #[instrument(level = "info", skip_all, fields(chars = text.len()))]
    pub async fn summarize(
        &self,
        text: &str,
        min_sentences: usize,
        max_sentences: usize,
    ) -> SummaryResult {
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_SUMMARIZABLE_LEN {
            let summary = if trimmed.is_empty() {
                "No content to summarize.".to_string()
            } else {
                trimmed.to_string()
            };
            return SummaryResult {
                original_length: word_count(text),
                summary_length: word_count(&summary).min(word_count(text)),
                compression_ratio: 1.0,
                summary,
            };
        }

        let system = "You are an expert text summarization AI. Create concise, accurate \
                      summaries that capture the key information.";
        let user = format!(
            "Create a concise, informative summary of the following text. Keep the summary \
             between {min_sentences}-{max_sentences} sentences, focus on the most important \
             information, and provide only the summary text with no additional formatting.\n\n\
             Text: \"{text}\""
        );

        match self.backend.ask(system, &user, 300, 0.3).await {
            Ok(summary) if !summary.is_empty() => SummaryResult::from_summary(text, summary),
            Ok(_) => {
                warn!("Empty summary reply; using leading-sentences fallback");
                SummaryResult::fallback(text, max_sentences)
            }
            Err(e) => {
                warn!(error = %e, "Summary service unavailable; using leading-sentences fallback");
                SummaryResult::fallback(text, max_sentences)
            }
        }
    }

    /// Full analysis: sentiment on title+text, summary on the text, plus
    /// content metrics. The title gives the sentiment model context.
    pub async fn analyze_content(&self, text: &str, title: &str) -> ContentAnalysis {
        let full_text = if title.is_empty() {
            text.to_string()
        } else {
            format!("{title}. {text}")
        };

        let sentiment = self.analyze_sentiment(&full_text).await;
        let summary = self.summarize(text, 1, 3).await;

        let words = word_count(text);
        info!(words, label = %sentiment.label, "Content analysis complete");
        ContentAnalysis {
            sentiment: Some(sentiment),
            summary: Some(summary),
            metrics: ContentMetrics {
                word_count: words,
                character_count: text.chars().count(),
                estimated_reading_time: std::cmp::max(1, words / READING_WPM),
            },
            original_text_length: words,
            analysis_timestamp: Local::now().to_rfc3339(),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Models love to wrap JSON in markdown fences; strip them before parsing.
fn strip_fences(reply: &str) -> &str {
    reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
