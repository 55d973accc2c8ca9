//! Alpha Vantage client for fundamentals, analyst ratings and news

use crate::error::{MarketError, Result};
use crate::types::{AnalystRecommendations, Fundamentals, NewsItem};
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

/// Fundamentals and ratings for the same symbol within this window share one
/// `OVERVIEW` request.
const OVERVIEW_REUSE_WINDOW: Duration = Duration::from_secs(60);

/// `OVERVIEW` payload. Every value arrives as a string; "None", "-" and ""
/// mean missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyOverview {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub exchange: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub sector: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub industry: Option<String>,
    #[serde(rename = "MarketCapitalization", default, deserialize_with = "number")]
    pub market_cap: Option<f64>,
    #[serde(rename = "PERatio", default, deserialize_with = "number")]
    pub pe_ratio: Option<f64>,
    #[serde(rename = "EPS", default, deserialize_with = "number")]
    pub eps: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub dividend_yield: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub book_value: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub profit_margin: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub beta: Option<f64>,
    #[serde(rename = "52WeekHigh", default, deserialize_with = "number")]
    pub week_52_high: Option<f64>,
    #[serde(rename = "52WeekLow", default, deserialize_with = "number")]
    pub week_52_low: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub analyst_target_price: Option<f64>,
    #[serde(default, deserialize_with = "number")]
    pub analyst_rating_strong_buy: Option<u32>,
    #[serde(default, deserialize_with = "number")]
    pub analyst_rating_buy: Option<u32>,
    #[serde(default, deserialize_with = "number")]
    pub analyst_rating_hold: Option<u32>,
    #[serde(default, deserialize_with = "number")]
    pub analyst_rating_sell: Option<u32>,
    #[serde(default, deserialize_with = "number")]
    pub analyst_rating_strong_sell: Option<u32>,
}

impl CompanyOverview {
    pub fn recommendations(&self, symbol: &str) -> AnalystRecommendations {
        AnalystRecommendations {
            symbol: symbol.to_string(),
            target_price: self.analyst_target_price,
            strong_buy: self.analyst_rating_strong_buy.unwrap_or(0),
            buy: self.analyst_rating_buy.unwrap_or(0),
            hold: self.analyst_rating_hold.unwrap_or(0),
            sell: self.analyst_rating_sell.unwrap_or(0),
            strong_sell: self.analyst_rating_strong_sell.unwrap_or(0),
        }
    }

    pub fn fundamentals(&self, symbol: &str) -> Fundamentals {
        Fundamentals {
            symbol: symbol.to_string(),
            name: self.name.clone(),
            exchange: self.exchange.clone(),
            currency: self.currency.clone(),
            sector: self.sector.clone(),
            industry: self.industry.clone(),
            market_cap: self.market_cap,
            pe_ratio: self.pe_ratio,
            eps: self.eps,
            dividend_yield: self.dividend_yield,
            book_value: self.book_value,
            profit_margin: self.profit_margin,
            beta: self.beta,
            week_52_high: self.week_52_high,
            week_52_low: self.week_52_low,
        }
    }
}

/// `NEWS_SENTIMENT` payload
#[derive(Debug, Default, Deserialize)]
struct NewsFeed {
    #[serde(default)]
    feed: Vec<FeedArticle>,
}

#[derive(Debug, Deserialize)]
struct FeedArticle {
    #[serde(default, deserialize_with = "text")]
    title: Option<String>,
    #[serde(default, deserialize_with = "text")]
    url: Option<String>,
    #[serde(default, deserialize_with = "text")]
    time_published: Option<String>,
    #[serde(default, deserialize_with = "text")]
    summary: Option<String>,
    #[serde(default, deserialize_with = "text")]
    source: Option<String>,
    #[serde(default, deserialize_with = "text")]
    overall_sentiment_label: Option<String>,
}

impl FeedArticle {
    fn into_news_item(self) -> Option<NewsItem> {
        Some(NewsItem {
            title: self.title?,
            url: self.url?,
            source: self.source,
            published_at: self.time_published.as_deref().and_then(parse_timestamp),
            summary: self.summary,
            sentiment: self.overall_sentiment_label,
        })
    }
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    let value = match raw {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Ok(None),
    };
    Ok(Some(value).filter(|s| !s.is_empty() && s != "None" && s != "-"))
}

fn number<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    Ok(text(deserializer)?.and_then(|s| s.parse().ok()))
}

/// Last `OVERVIEW` fetched
#[derive(Debug, Default)]
struct OverviewMemo {
    entry: Option<(String, Instant, CompanyOverview)>,
}

impl OverviewMemo {
    fn get(&self, symbol: &str, now: Instant) -> Option<CompanyOverview> {
        self.entry
            .as_ref()
            .filter(|(cached, at, _)| cached == symbol && now.duration_since(*at) < OVERVIEW_REUSE_WINDOW)
            .map(|(_, _, overview)| overview.clone())
    }

    fn put(&mut self, symbol: &str, now: Instant, overview: CompanyOverview) {
        self.entry = Some((symbol.to_string(), now, overview));
    }
}

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
    last_overview: Arc<Mutex<OverviewMemo>>,
}

impl AlphaVantageClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            last_overview: Arc::default(),
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// `OVERVIEW` for `symbol`; feeds both fundamentals and analyst ratings
    pub async fn company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let mut memo = self.last_overview.lock().await;
        if let Some(overview) = memo.get(symbol, Instant::now()) {
            debug!(symbol, "Reusing recent Alpha Vantage overview");
            return Ok(overview);
        }

        let data = self.query(&[("function", "OVERVIEW"), ("symbol", symbol)]).await?;
        if data.as_object().is_none_or(serde_json::Map::is_empty) {
            return Err(MarketError::UnknownSymbol(symbol.to_string()));
        }

        let overview: CompanyOverview = serde_json::from_value(data)?;
        memo.put(symbol, Instant::now(), overview.clone());
        Ok(overview)
    }

    /// Most recent `NEWS_SENTIMENT` articles mentioning `symbol`
    pub async fn company_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let limit_param = limit.max(1).to_string();
        let data = self
            .query(&[
                ("function", "NEWS_SENTIMENT"),
                ("tickers", symbol),
                ("sort", "LATEST"),
                ("limit", limit_param.as_str()),
            ])
            .await?;

        parse_news(data, limit)
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<Value> {
        debug!(?params, "Alpha Vantage request");

        // The key rides in the query string, so URLs are stripped from
        // transport errors before they reach logs or the model.
        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| MarketError::Network(e.without_url()))?;

        if !response.status().is_success() {
            return Err(MarketError::provider(
                PROVIDER,
                format!("HTTP error: {}", response.status()),
            ));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| MarketError::Network(e.without_url()))?;
        check_reply(data)
    }
}

/// Alpha Vantage answers 200 for everything; errors and throttling come back
/// as single-key objects.
fn check_reply(data: Value) -> Result<Value> {
    if let Some(message) = data.get("Error Message").and_then(Value::as_str) {
        return Err(MarketError::provider(PROVIDER, message));
    }

    let notice = data
        .get("Note")
        .or_else(|| data.get("Information"))
        .and_then(Value::as_str);
    match notice {
        Some(message) if is_throttle_notice(message) => Err(MarketError::RateLimited {
            provider: PROVIDER.to_string(),
        }),
        // Invalid key, premium endpoint, demo key misuse
        Some(message) => Err(MarketError::provider(PROVIDER, message)),
        None => Ok(data),
    }
}

fn is_throttle_notice(message: &str) -> bool {
    let message = message.to_lowercase();
    ["rate limit", "call frequency", "requests per", "calls per"]
        .iter()
        .any(|marker| message.contains(marker))
}

fn parse_news(data: Value, limit: usize) -> Result<Vec<NewsItem>> {
    let feed: NewsFeed = serde_json::from_value(data)?;
    Ok(feed
        .feed
        .into_iter()
        .filter_map(FeedArticle::into_news_item)
        .take(limit)
        .collect())
}

/// `20240105T143000` (seconds optional) in UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn overview() -> CompanyOverview {
        serde_json::from_value(json!({
            "Symbol": "AAPL",
            "Name": "Apple Inc",
            "Exchange": "NASDAQ",
            "Currency": "USD",
            "Sector": "TECHNOLOGY",
            "Industry": "ELECTRONIC COMPUTERS",
            "MarketCapitalization": "2950000000000",
            "PERatio": "29.4",
            "EPS": "6.43",
            "DividendYield": "0.0051",
            "BookValue": "None",
            "ProfitMargin": "0.253",
            "Beta": "-",
            "52WeekHigh": "199.62",
            "52WeekLow": "164.08",
            "AnalystTargetPrice": "210.5",
            "AnalystRatingStrongBuy": "12",
            "AnalystRatingBuy": "21",
            "AnalystRatingHold": "9",
            "AnalystRatingSell": "1",
            "AnalystRatingStrongSell": "None"
        }))
        .unwrap()
    }

    #[test]
    fn test_overview_fundamentals() {
        let f = overview().fundamentals("AAPL");
        assert_eq!(f.name.as_deref(), Some("Apple Inc"));
        assert_eq!(f.market_cap, Some(2_950_000_000_000.0));
        assert_eq!(f.pe_ratio, Some(29.4));
        assert_eq!(f.week_52_high, Some(199.62));
        assert_eq!(f.book_value, None);
        assert_eq!(f.beta, None);
    }

    #[test]
    fn test_overview_recommendations() {
        let r = overview().recommendations("AAPL");
        assert_eq!(r.target_price, Some(210.5));
        assert_eq!((r.strong_buy, r.buy, r.hold, r.sell, r.strong_sell), (12, 21, 9, 1, 0));
        assert_eq!(r.total(), 43);
    }

    #[test]
    fn test_overview_tolerates_odd_values() {
        let overview: CompanyOverview = serde_json::from_value(json!({
            "Name": "  ",
            "PERatio": 31.2,
            "AnalystRatingBuy": "99999999999",
            "Beta": null
        }))
        .unwrap();

        assert_eq!(overview.name, None);
        assert_eq!(overview.pe_ratio, Some(31.2));
        assert_eq!(overview.analyst_rating_buy, None);
        assert_eq!(overview.beta, None);
    }

    #[test]
    fn test_parse_news() {
        let data = json!({
            "items": "3",
            "feed": [
                {
                    "title": "Apple unveils new chips",
                    "url": "https://example.com/a",
                    "time_published": "20240105T143000",
                    "source": "Reuters",
                    "summary": "New silicon.",
                    "overall_sentiment_label": "Somewhat-Bullish"
                },
                {"title": "", "url": "https://example.com/skip"},
                {
                    "title": "Apple earnings preview",
                    "url": "https://example.com/b",
                    "time_published": "garbage"
                },
                {"title": "Third", "url": "https://example.com/c"}
            ]
        });

        let news = parse_news(data, 2).unwrap();
        assert_eq!(news.len(), 2);
        assert_eq!(news[0].source.as_deref(), Some("Reuters"));
        let published = news[0].published_at.unwrap();
        assert_eq!((published.year(), published.month(), published.day()), (2024, 1, 5));
        assert_eq!(published.hour(), 14);
        assert_eq!(news[1].title, "Apple earnings preview");
        assert!(news[1].published_at.is_none());
    }

    #[test]
    fn test_parse_news_without_feed() {
        assert!(parse_news(json!({}), 3).unwrap().is_empty());
    }

    #[test]
    fn test_check_reply() {
        assert!(matches!(
            check_reply(json!({"Error Message": "Invalid API call"})),
            Err(MarketError::Provider { .. })
        ));
        assert!(matches!(
            check_reply(json!({"Note": "Our standard API call frequency is 5 calls per minute"})),
            Err(MarketError::RateLimited { .. })
        ));
        assert!(matches!(
            check_reply(json!({"Information": "Our standard API rate limit is 25 requests per day."})),
            Err(MarketError::RateLimited { .. })
        ));
        assert!(check_reply(json!({"Symbol": "AAPL"})).is_ok());
    }

    #[test]
    fn test_non_throttle_information_is_a_provider_error() {
        let err = check_reply(json!({
            "Information": "The **demo** API key is for demo purposes only. Please claim your free API key."
        }))
        .unwrap_err();

        assert!(matches!(err, MarketError::Provider { .. }));
        assert!(err.to_string().contains("demo purposes"));
    }

    #[test]
    fn test_overview_memo() {
        let start = Instant::now();
        let mut memo = OverviewMemo::default();
        assert!(memo.get("AAPL", start).is_none());

        memo.put("AAPL", start, overview());
        assert!(memo.get("AAPL", start + Duration::from_secs(5)).is_some());
        assert!(memo.get("MSFT", start).is_none());
        assert!(memo.get("AAPL", start + OVERVIEW_REUSE_WINDOW).is_none());
    }

    #[tokio::test]
    async fn test_transport_errors_do_not_expose_the_api_key() {
        // Nothing listens on port 1
        let client = AlphaVantageClient::new("SUPERSECRETKEY", Duration::from_secs(2))
            .unwrap()
            .with_base_url("http://127.0.0.1:1/query");

        let err = client.company_overview("AAPL").await.unwrap_err();
        assert!(matches!(err, MarketError::Network(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"));

        let err = client.company_news("AAPL", 3).await.unwrap_err();
        let agent_err: digest_agent::AgentError = err.into();
        assert!(!agent_err.to_string().contains("SUPERSECRETKEY"));
    }

    #[tokio::test]
    #[ignore] // Requires network access and ALPHA_VANTAGE_API_KEY
    async fn test_live_overview() {
        let key = std::env::var("ALPHA_VANTAGE_API_KEY").unwrap();
        let client = AlphaVantageClient::new(key, Duration::from_secs(30)).unwrap();
        let overview = client.company_overview("IBM").await.unwrap();
        assert!(overview.name.is_some());
    }
}
