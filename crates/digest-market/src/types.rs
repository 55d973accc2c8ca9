//! Value types returned by the capabilities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest trading bar for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    /// Last close of the most recent bar
    pub price: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
    pub timestamp: DateTime<Utc>,
}

/// Sell-side rating counts and price target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalystRecommendations {
    pub symbol: String,
    pub target_price: Option<f64>,
    pub strong_buy: u32,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
}

impl AnalystRecommendations {
    pub fn total(&self) -> u64 {
        [self.strong_buy, self.buy, self.hold, self.sell, self.strong_sell]
            .into_iter()
            .map(u64::from)
            .sum()
    }

    /// Label for the weighted mean rating (strong buy = 5 ... strong sell = 1)
    pub fn consensus(&self) -> Option<&'static str> {
        let total = self.total();
        if total == 0 {
            return None;
        }

        let weighted: u64 = [
            (5, self.strong_buy),
            (4, self.buy),
            (3, self.hold),
            (2, self.sell),
            (1, self.strong_sell),
        ]
        .into_iter()
        .map(|(weight, count)| weight * u64::from(count))
        .sum();
        #[allow(clippy::cast_precision_loss)]
        let score = weighted as f64 / total as f64;
        Some(match score {
            s if s >= 4.5 => "Strong Buy",
            s if s >= 3.5 => "Buy",
            s if s >= 2.5 => "Hold",
            s if s >= 1.5 => "Sell",
            _ => "Strong Sell",
        })
    }
}

/// Company profile and headline valuation metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub symbol: String,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub currency: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub book_value: Option<f64>,
    pub profit_margin: Option<f64>,
    pub beta: Option<f64>,
    pub week_52_high: Option<f64>,
    pub week_52_low: Option<f64>,
}

/// A company news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub source: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub sentiment: Option<String>,
}

/// One web search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Human-readable market cap, e.g. `2.95T`
pub fn format_market_cap(value: f64) -> String {
    match value {
        v if v >= 1e12 => format!("{:.2}T", v / 1e12),
        v if v >= 1e9 => format!("{:.2}B", v / 1e9),
        v if v >= 1e6 => format!("{:.2}M", v / 1e6),
        v => format!("{v:.0}"),
    }
}
