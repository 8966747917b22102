//! Search and polite scraping.
//!
//! One [`Collector::collect`] call covers a single search query: ask the
//! search service for the top-ranked pages, then fetch each page under
//! robots-compliance and rate-limiting policy and extract its visible
//! text. Per-URL failures are swallowed — a failed URL is simply absent
//! from the result set. Only a search transport failure is an error.

/// Visible-text extraction from HTML.
pub mod extract;
/// Minimal robots.txt retrieval and prefix matching.
pub mod robots;

use crate::config::ResearchConfig;
use crate::types::{AppError, Result};
use rand::seq::IndexedRandom;
use serde::Deserialize;
use std::time::Duration;

/// Rotating pool of realistic browser user agents used for page fetches
/// and robots checks.
const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/17.6 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:132.0) Gecko/20100101 Firefox/132.0",
];

/// One successfully scraped page.
#[derive(Debug, Clone)]
pub struct PageCapture {
    /// The page URL.
    pub url: String,
    /// Title reported by the search service.
    pub title: String,
    /// Extracted visible text, truncated to the configured budget.
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchHit {
    url: Option<String>,
    #[serde(default)]
    title: String,
}

/// Issues search queries and scrapes the top-ranked result pages.
pub struct Collector {
    http: reqwest::Client,
    search_url: String,
    urls_per_query: usize,
    max_content_chars: usize,
    scrape_delay: Duration,
    fetch_timeout: Duration,
    respect_robots: bool,
}

impl Collector {
    /// Build a collector from the shared configuration.
    pub fn new(config: &ResearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| AppError::Search(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            search_url: config.search_url.clone(),
            urls_per_query: config.urls_per_query,
            max_content_chars: config.max_content_chars,
            scrape_delay: Duration::from_millis(config.scrape_delay_ms),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            respect_robots: config.respect_robots,
        })
    }

    /// Search for `query` and scrape the top-ranked pages.
    ///
    /// Fetches for the distinct URLs run concurrently once dispatched,
    /// with a fixed politeness delay between successive dispatches.
    /// Result order follows search rank, not completion order. Returns
    /// an empty vec when every URL failed or the search had no hits.
    pub async fn collect(&self, query: &str) -> Result<Vec<PageCapture>> {
        let hits = self.search(query).await?;
        if hits.is_empty() {
            tracing::warn!(query, "search returned no results");
            return Ok(Vec::new());
        }

        let mut handles = Vec::with_capacity(hits.len());
        for hit in &hits {
            let url = match &hit.url {
                Some(url) => url.clone(),
                None => continue,
            };
            let fetch = fetch_page(
                self.http.clone(),
                url,
                self.respect_robots,
                self.fetch_timeout,
                self.max_content_chars,
            );
            handles.push((hit.clone(), tokio::spawn(fetch)));
            tokio::time::sleep(self.scrape_delay).await;
        }

        let mut captures = Vec::new();
        for (hit, handle) in handles {
            if let Ok(Some(content)) = handle.await {
                captures.push(PageCapture {
                    url: hit.url.unwrap_or_default(),
                    title: hit.title,
                    content,
                });
            }
        }

        tracing::info!(query, pages = captures.len(), "collected pages");
        Ok(captures)
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response = self
            .http
            .get(&self.search_url)
            .query(&[("q", query), ("format", "json"), ("language", "en")])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Search(format!("search service returned {status}")));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("malformed search response: {e}")))?;

        Ok(parsed
            .results
            .into_iter()
            .take(self.urls_per_query)
            .collect())
    }
}

/// Fetch one page and extract its text. Any failure — robots disallow,
/// transport error, non-HTML content, empty extraction — yields `None`.
async fn fetch_page(
    http: reqwest::Client,
    url: String,
    respect_robots: bool,
    timeout: Duration,
    max_chars: usize,
) -> Option<String> {
    let agent = *USER_AGENTS
        .choose(&mut rand::rng())
        .unwrap_or(&USER_AGENTS[0]);

    if respect_robots && !robots::allowed(&http, &url, agent, timeout).await {
        tracing::warn!(%url, "robots.txt disallows scraping");
        return None;
    }

    let response = http
        .get(&url)
        .header(reqwest::header::USER_AGENT, agent)
        .header(reqwest::header::ACCEPT, "text/html")
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| tracing::warn!(%url, error = %e, "page fetch failed"))
        .ok()?;

    if !response.status().is_success() {
        tracing::warn!(%url, status = %response.status(), "page fetch rejected");
        return None;
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.is_empty()
        && !content_type.contains("text/html")
        && !content_type.contains("text/plain")
    {
        tracing::warn!(%url, content_type, "unsupported content type");
        return None;
    }

    let body = response.text().await.ok()?;
    let text = extract::html_to_text(&body, max_chars);
    if text.is_empty() {
        tracing::warn!(%url, "page contained no extractable text");
        return None;
    }
    Some(text)
}
