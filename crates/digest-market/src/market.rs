//! Market data capability

use crate::api::{AlphaVantageClient, YahooFinanceClient};
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::types::{AnalystRecommendations, Fundamentals, NewsItem, StockQuote};
use async_trait::async_trait;
use tracing::debug;

/// Everything the analyst can look up about a listed company
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<StockQuote>;

    async fn analyst_recommendations(&self, symbol: &str) -> Result<AnalystRecommendations>;

    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals>;

    /// Newest first, at most `limit` articles
    async fn company_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>>;
}

/// Yahoo Finance for quotes, Alpha Vantage for the rest
#[derive(Debug, Clone)]
pub struct MarketDataClient {
    yahoo: YahooFinanceClient,
    alpha_vantage: Option<AlphaVantageClient>,
}

impl MarketDataClient {
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let alpha_vantage = config
            .alpha_vantage_api_key
            .as_deref()
            .map(|key| AlphaVantageClient::new(key, config.request_timeout))
            .transpose()?;

        if alpha_vantage.is_none() {
            debug!("ALPHA_VANTAGE_API_KEY not set; only price lookups are available");
        }

        Ok(Self {
            yahoo: YahooFinanceClient::new(config.request_timeout),
            alpha_vantage,
        })
    }

    fn alpha_vantage(&self) -> Result<&AlphaVantageClient> {
        self.alpha_vantage.as_ref().ok_or_else(|| {
            MarketError::Config(
                "ALPHA_VANTAGE_API_KEY is required for recommendations, fundamentals and news"
                    .to_string(),
            )
        })
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[async_trait]
impl MarketData for MarketDataClient {
    async fn quote(&self, symbol: &str) -> Result<StockQuote> {
        self.yahoo.get_quote(&normalize(symbol)).await
    }

    async fn analyst_recommendations(&self, symbol: &str) -> Result<AnalystRecommendations> {
        let symbol = normalize(symbol);
        let overview = self.alpha_vantage()?.company_overview(&symbol).await?;
        Ok(overview.recommendations(&symbol))
    }

    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let symbol = normalize(symbol);
        let overview = self.alpha_vantage()?.company_overview(&symbol).await?;
        Ok(overview.fundamentals(&symbol))
    }

    async fn company_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let symbol = normalize(symbol);
        self.alpha_vantage()?.company_news(&symbol, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_alpha_vantage_lookups_need_a_key() {
        let client = MarketDataClient::new(&MarketConfig::default()).unwrap();

        let err = client.fundamentals("AAPL").await.unwrap_err();
        assert!(matches!(err, MarketError::Config(_)));

        let err = client.company_news("AAPL", 3).await.unwrap_err();
        assert!(err.to_string().contains("ALPHA_VANTAGE_API_KEY"));
    }

    #[test]
    fn test_client_with_key() {
        let config = MarketConfig::builder().alpha_vantage_api_key("demo").build();
        let client = MarketDataClient::new(&config).unwrap();
        assert!(client.alpha_vantage().is_ok());
    }

    #[test]
    fn test_quotes_use_configured_timeout() {
        let config = MarketConfig::builder()
            .request_timeout(Duration::from_secs(7))
            .build();
        let client = MarketDataClient::new(&config).unwrap();
        assert_eq!(client.yahoo.timeout(), Duration::from_secs(7));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(" msft "), "MSFT");
    }

    #[tokio::test]
    #[ignore] // Requires network access and ALPHA_VANTAGE_API_KEY
    async fn test_live_fundamentals() {
        let key = std::env::var("ALPHA_VANTAGE_API_KEY").unwrap();
        let config = MarketConfig::builder().alpha_vantage_api_key(key).build();
        let client = MarketDataClient::new(&config).unwrap();
        let fundamentals = client.fundamentals("IBM").await.unwrap();
        assert_eq!(fundamentals.symbol, "IBM");
    }
}
