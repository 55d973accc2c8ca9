//! DuckDuckGo web and news search
//!
//! Web results are scraped from the HTML endpoint. News needs a `vqd` token
//! from the main page before `news.js` will answer.

use crate::error::{MarketError, Result};
use crate::search::WebSearch;
use crate::types::{NewsItem, SearchHit};
use async_trait::async_trait;
use chrono::DateTime;
use regex::Regex;
use reqwest::Client;
use reqwest::header::REFERER;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

const HTML_URL: &str = "https://html.duckduckgo.com/html/";
const HOME_URL: &str = "https://duckduckgo.com/";
const NEWS_URL: &str = "https://duckduckgo.com/news.js";
const PROVIDER: &str = "DuckDuckGo";

/// Compiled once per client
#[derive(Debug, Clone)]
struct Patterns {
    div_class: Regex,
    anchor: Regex,
    href: Regex,
    snippet: Regex,
    tag: Regex,
    vqd: Regex,
}

impl Patterns {
    fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| MarketError::Config(format!("Invalid search pattern: {e}")))
        };
        Ok(Self {
            div_class: compile(r#"<div[^>]*\sclass="([^"]*)""#)?,
            anchor: compile(r"(?s)<a\b([^>]*)>(.*?)</a>")?,
            href: compile(r#"href="([^"]*)""#)?,
            snippet: compile(r#"(?s)class="result__snippet"[^>]*>(.*?)</(?:a|div|td)>"#)?,
            tag: compile(r"<[^>]*>")?,
            vqd: compile(r#"vqd=["']?([0-9-]+)"#)?,
        })
    }

    /// Organic results in page order; ads are skipped
    fn parse_html_results(&self, html: &str, max_results: usize) -> Vec<SearchHit> {
        let blocks: Vec<(usize, bool)> = self
            .div_class
            .captures_iter(html)
            .filter_map(|caps| {
                let start = caps.get(0)?.start();
                let classes: Vec<&str> = caps.get(1)?.as_str().split_whitespace().collect();
                classes
                    .contains(&"result")
                    .then(|| (start, classes.iter().any(|c| c.starts_with("result--ad"))))
            })
            .collect();

        let mut hits = Vec::new();
        for (i, &(start, is_ad)) in blocks.iter().enumerate() {
            if hits.len() >= max_results {
                break;
            }
            if is_ad {
                continue;
            }
            let end = blocks.get(i + 1).map_or(html.len(), |&(next, _)| next);
            if let Some(hit) = self.parse_block(&html[start..end]) {
                hits.push(hit);
            }
        }
        hits
    }

    fn parse_block(&self, block: &str) -> Option<SearchHit> {
        let (attrs, title) = self.anchor.captures_iter(block).find_map(|caps| {
            let attrs = caps.get(1)?.as_str();
            attrs
                .contains(r#"class="result__a""#)
                .then(|| (attrs, caps.get(2).map_or("", |m| m.as_str())))
        })?;

        let href = self.href.captures(attrs)?.get(1)?.as_str();
        let url = resolve_result_url(&decode_entities(href))?;
        let title = self.plain_text(title);
        if title.is_empty() {
            return None;
        }

        let snippet = self
            .snippet
            .captures(block)
            .and_then(|caps| caps.get(1))
            .map(|m| self.plain_text(m.as_str()))
            .unwrap_or_default();

        Some(SearchHit { title, url, snippet })
    }

    fn extract_vqd(&self, page: &str) -> Option<String> {
        self.vqd
            .captures(page)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn parse_news_json(&self, body: &str, max_results: usize) -> Result<Vec<NewsItem>> {
        let response: NewsResponse = serde_json::from_str(body)?;
        Ok(response
            .results
            .into_iter()
            .filter_map(|result| self.news_item(result))
            .take(max_results)
            .collect())
    }

    fn news_item(&self, result: NewsResult) -> Option<NewsItem> {
        let title = self.plain_text(&result.title);
        let url = result.url.trim().to_string();
        if title.is_empty() || url.is_empty() {
            return None;
        }
        Some(NewsItem {
            title,
            url,
            source: result.source.filter(|s| !s.trim().is_empty()),
            published_at: result.date.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            summary: result
                .excerpt
                .map(|excerpt| self.plain_text(&excerpt))
                .filter(|s| !s.is_empty()),
            sentiment: None,
        })
    }

    /// Tags removed, entities decoded, whitespace collapsed
    fn plain_text(&self, fragment: &str) -> String {
        let stripped = self.tag.replace_all(fragment, "");
        decode_entities(&stripped).split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Result links go through `//duckduckgo.com/l/?uddg=<target>`
fn resolve_result_url(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let url = Url::parse(&absolute).ok()?;

    if url.path().starts_with("/l/") {
        return url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, target)| target.into_owned());
    }
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Vec<NewsResult>,
}

#[derive(Debug, Deserialize)]
struct NewsResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    source: Option<String>,
    /// Unix seconds
    #[serde(default)]
    date: Option<i64>,
}

/// Keyless web and news search backed by DuckDuckGo
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    client: Client,
    patterns: Patterns,
}

impl DuckDuckGoSearch {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("Mozilla/5.0 (compatible; stock-digest/", env!("CARGO_PKG_VERSION"), ")"))
            .build()?;
        Ok(Self {
            client,
            patterns: Patterns::new()?,
        })
    }

    async fn get_text(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(REFERER, HOME_URL)
            .query(params)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.without_url()))?;

        if !response.status().is_success() {
            return Err(MarketError::provider(
                PROVIDER,
                format!("HTTP error: {}", response.status()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| MarketError::Network(e.without_url()))
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        debug!(query, max_results, "DuckDuckGo search");
        let html = self.get_text(HTML_URL, &[("q", query)]).await?;
        Ok(self.patterns.parse_html_results(&html, max_results))
    }

    async fn news(&self, query: &str, max_results: usize) -> Result<Vec<NewsItem>> {
        debug!(query, max_results, "DuckDuckGo news");

        let page = self.get_text(HOME_URL, &[("q", query)]).await?;
        let vqd = self
            .patterns
            .extract_vqd(&page)
            .ok_or_else(|| MarketError::provider(PROVIDER, "No vqd token in search page"))?;

        let body = self
            .get_text(
                NEWS_URL,
                &[
                    ("l", "us-en"),
                    ("o", "json"),
                    ("noamp", "1"),
                    ("q", query),
                    ("vqd", vqd.as_str()),
                    ("p", "-1"),
                ],
            )
            .await?;
        self.patterns.parse_news_json(&body, max_results)
    }
}
