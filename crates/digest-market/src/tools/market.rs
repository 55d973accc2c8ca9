//! Agent tools over [`MarketData`]

use async_trait::async_trait;
use digest_agent::{AgentError, Result as AgentResult, Tool};
use digest_llm::tools::schema;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::market::MarketData;
use crate::types::format_market_cap;

const DEFAULT_NEWS_LIMIT: usize = 3;
const MAX_NEWS_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct SymbolParams {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct NewsParams {
    symbol: String,
    #[serde(default)]
    limit: Option<usize>,
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> AgentResult<T> {
    serde_json::from_value(params).map_err(|e| AgentError::Tool(format!("Invalid parameters: {e}")))
}

fn symbol_only_schema() -> Value {
    schema::object(
        json!({ "symbol": schema::string("Stock ticker symbol (e.g., 'AAPL', 'NVDA')") }),
        &["symbol"],
    )
}

/// Integer in `1..=max`
pub(crate) fn count_schema(description: &str, max: usize) -> Value {
    let mut count = schema::integer(description);
    count["minimum"] = json!(1);
    count["maximum"] = json!(max);
    count
}

/// `get_current_stock_price`
pub struct StockPriceTool {
    market: Arc<dyn MarketData>,
}

impl StockPriceTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let quote = self.market.quote(&params.symbol).await?;

        Ok(json!({
            "symbol": quote.symbol,
            "price": quote.price,
            "open": quote.open,
            "high": quote.high,
            "low": quote.low,
            "volume": quote.volume,
            "as_of": quote.timestamp.to_rfc3339(),
        }))
    }

    fn name(&self) -> &'static str {
        "get_current_stock_price"
    }

    fn description(&self) -> &'static str {
        "Get the latest stock price for a ticker symbol, with the day's open, high, low and volume."
    }

    fn input_schema(&self) -> Value {
        symbol_only_schema()
    }
}

/// `get_analyst_recommendations`
pub struct AnalystRecommendationsTool {
    market: Arc<dyn MarketData>,
}

impl AnalystRecommendationsTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for AnalystRecommendationsTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let recs = self.market.analyst_recommendations(&params.symbol).await?;

        Ok(json!({
            "symbol": recs.symbol,
            "consensus": recs.consensus(),
            "target_price": recs.target_price,
            "analysts": recs.total(),
            "ratings": {
                "strong_buy": recs.strong_buy,
                "buy": recs.buy,
                "hold": recs.hold,
                "sell": recs.sell,
                "strong_sell": recs.strong_sell,
            }
        }))
    }

    fn name(&self) -> &'static str {
        "get_analyst_recommendations"
    }

    fn description(&self) -> &'static str {
        "Get sell-side analyst rating counts, the consensus rating and the mean price target for a ticker."
    }

    fn input_schema(&self) -> Value {
        symbol_only_schema()
    }
}

/// `get_stock_fundamentals`
pub struct StockFundamentalsTool {
    market: Arc<dyn MarketData>,
}

impl StockFundamentalsTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for StockFundamentalsTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let f = self.market.fundamentals(&params.symbol).await?;

        Ok(json!({
            "symbol": f.symbol,
            "name": f.name,
            "exchange": f.exchange,
            "currency": f.currency,
            "sector": f.sector,
            "industry": f.industry,
            "market_cap": f.market_cap.map(format_market_cap),
            "pe_ratio": f.pe_ratio,
            "eps": f.eps,
            "dividend_yield": f.dividend_yield,
            "book_value": f.book_value,
            "profit_margin": f.profit_margin,
            "beta": f.beta,
            "52_week_high": f.week_52_high,
            "52_week_low": f.week_52_low,
        }))
    }

    fn name(&self) -> &'static str {
        "get_stock_fundamentals"
    }

    fn description(&self) -> &'static str {
        "Get company fundamentals for a ticker: sector, market cap, P/E, EPS, dividend yield, \
         margins, beta and 52-week range."
    }

    fn input_schema(&self) -> Value {
        symbol_only_schema()
    }
}

/// `get_company_news`
pub struct CompanyNewsTool {
    market: Arc<dyn MarketData>,
}

impl CompanyNewsTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for CompanyNewsTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: NewsParams = parse_params(params)?;
        let limit = params
            .limit
            .unwrap_or(DEFAULT_NEWS_LIMIT)
            .clamp(1, MAX_NEWS_LIMIT);

        let news = self.market.company_news(&params.symbol, limit).await?;

        let articles: Vec<Value> = news
            .iter()
            .map(|item| {
                json!({
                    "title": item.title,
                    "url": item.url,
                    "source": item.source,
                    "published_at": item.published_at.map(|t| t.to_rfc3339()),
                    "summary": item.summary,
                    "sentiment": item.sentiment,
                })
            })
            .collect();

        Ok(json!({
            "symbol": params.symbol.trim().to_uppercase(),
            "count": articles.len(),
            "articles": articles,
        }))
    }

    fn name(&self) -> &'static str {
        "get_company_news"
    }

    fn description(&self) -> &'static str {
        "Get the most recent news articles about a company, with source, publication date and sentiment."
    }

    fn input_schema(&self) -> Value {
        let mut input = symbol_only_schema();
        input["properties"]["limit"] =
            count_schema("Number of articles to return (default 3, max 10)", MAX_NEWS_LIMIT);
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarketError;
    use crate::market::MockMarketData;
    use crate::types::{AnalystRecommendations, Fundamentals, NewsItem, StockQuote};
    use chrono::{TimeZone, Utc};

    fn quote() -> StockQuote {
        StockQuote {
            symbol: "AAPL".into(),
            price: 189.25,
            open: 187.0,
            high: 190.1,
            low: 186.5,
            volume: 52_000_000,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 5, 21, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_stock_price_tool() {
        let mut market = MockMarketData::new();
        market
            .expect_quote()
            .withf(|symbol| symbol == "AAPL")
            .times(1)
            .returning(|_| Ok(quote()));

        let tool = StockPriceTool::new(Arc::new(market));
        let out = tool.execute(json!({"symbol": "AAPL"})).await.unwrap();

        assert_eq!(out["price"], 189.25);
        assert_eq!(out["as_of"], "2024-01-05T21:00:00+00:00");
    }

    #[tokio::test]
    async fn test_missing_symbol_is_a_tool_error() {
        let tool = StockPriceTool::new(Arc::new(MockMarketData::new()));
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(err.to_string().contains("Invalid parameters"));
    }

    #[tokio::test]
    async fn test_provider_errors_surface_as_tool_errors() {
        let mut market = MockMarketData::new();
        market
            .expect_fundamentals()
            .returning(|s| Err(MarketError::UnknownSymbol(s.to_string())));

        let tool = StockFundamentalsTool::new(Arc::new(market));
        let err = tool.execute(json!({"symbol": "ZZZZ"})).await.unwrap_err();
        assert_eq!(err.to_string(), "Tool failed: Unknown symbol: ZZZZ");
    }

    #[tokio::test]
    async fn test_recommendations_tool() {
        let mut market = MockMarketData::new();
        market.expect_analyst_recommendations().returning(|s| {
            Ok(AnalystRecommendations {
                symbol: s.to_string(),
                target_price: Some(210.0),
                strong_buy: 10,
                buy: 20,
                hold: 8,
                ..Default::default()
            })
        });

        let tool = AnalystRecommendationsTool::new(Arc::new(market));
        let out = tool.execute(json!({"symbol": "AAPL"})).await.unwrap();

        assert_eq!(out["consensus"], "Buy");
        assert_eq!(out["analysts"], 38);
        assert_eq!(out["ratings"]["hold"], 8);
    }

    #[tokio::test]
    async fn test_fundamentals_tool_formats_market_cap() {
        let mut market = MockMarketData::new();
        market.expect_fundamentals().returning(|s| {
            Ok(Fundamentals {
                symbol: s.to_string(),
                market_cap: Some(2_950_000_000_000.0),
                pe_ratio: Some(29.4),
                ..Default::default()
            })
        });

        let tool = StockFundamentalsTool::new(Arc::new(market));
        let out = tool.execute(json!({"symbol": "AAPL"})).await.unwrap();

        assert_eq!(out["market_cap"], "2.95T");
        assert_eq!(out["pe_ratio"], 29.4);
        assert!(out["beta"].is_null());
    }

    #[tokio::test]
    async fn test_news_tool_defaults_to_three_articles() {
        let mut market = MockMarketData::new();
        market
            .expect_company_news()
            .withf(|symbol, limit| symbol == "AAPL" && *limit == 3)
            .returning(|_, _| {
                Ok(vec![NewsItem {
                    title: "Apple unveils new chips".into(),
                    url: "https://example.com/a".into(),
                    source: Some("Reuters".into()),
                    published_at: None,
                    summary: None,
                    sentiment: Some("Bullish".into()),
                }])
            });

        let tool = CompanyNewsTool::new(Arc::new(market));
        let out = tool.execute(json!({"symbol": "AAPL"})).await.unwrap();

        assert_eq!(out["count"], 1);
        assert_eq!(out["articles"][0]["source"], "Reuters");
    }

    #[test]
    fn test_news_tool_schema() {
        let tool = CompanyNewsTool::new(Arc::new(MockMarketData::new()));
        let input = tool.input_schema();

        assert_eq!(input["type"], "object");
        assert_eq!(input["required"], json!(["symbol"]));
        assert_eq!(input["properties"]["symbol"]["type"], "string");
        assert_eq!(input["properties"]["limit"]["maximum"], 10);
    }

    #[tokio::test]
    async fn test_news_tool_caps_limit() {
        let mut market = MockMarketData::new();
        market
            .expect_company_news()
            .withf(|_, limit| *limit == MAX_NEWS_LIMIT)
            .returning(|_, _| Ok(Vec::new()));

        let tool = CompanyNewsTool::new(Arc::new(market));
        let out = tool.execute(json!({"symbol": "aapl", "limit": 50})).await.unwrap();

        assert_eq!(out["symbol"], "AAPL");
        assert_eq!(out["count"], 0);
    }
}
