//! Yahoo Finance quote client

use crate::error::{MarketError, Result};
use crate::types::StockQuote;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;
use yahoo_finance_api as yahoo;

const PROVIDER: &str = "Yahoo Finance";

/// Thin wrapper over `yahoo_finance_api` for latest quotes
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    timeout: Duration,
}

impl YahooFinanceClient {
    /// `timeout` bounds every quote request
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn connector(&self) -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| MarketError::provider(PROVIDER, e.to_string()))
    }

    /// Latest daily bar for `symbol`
    pub async fn get_quote(&self, symbol: &str) -> Result<StockQuote> {
        if symbol.trim().is_empty() {
            return Err(MarketError::UnknownSymbol(symbol.to_string()));
        }

        let response = self
            .connector()?
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| MarketError::provider(PROVIDER, e.to_string()))?;

        let quote = response
            .last_quote()
            .map_err(|e| MarketError::provider(PROVIDER, e.to_string()))?;

        debug!(symbol, close = quote.close, "Fetched Yahoo quote");

        Ok(StockQuote {
            symbol: symbol.to_string(),
            price: quote.close,
            open: quote.open,
            high: quote.high,
            low: quote.low,
            volume: quote.volume,
            timestamp: DateTime::from_timestamp(quote.timestamp as i64, 0).unwrap_or_else(Utc::now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_symbol_is_rejected_locally() {
        let client = YahooFinanceClient::new(Duration::from_secs(5));
        let err = client.get_quote("  ").await.unwrap_err();
        assert!(matches!(err, MarketError::UnknownSymbol(_)));
    }

    #[test]
    fn test_connector_honours_timeout() {
        let client = YahooFinanceClient::new(Duration::from_millis(1500));
        assert_eq!(client.timeout(), Duration::from_millis(1500));
        assert!(client.connector().is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_quote() {
        let client = YahooFinanceClient::new(Duration::from_secs(30));
        let quote = client.get_quote("AAPL").await.unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert!(quote.price > 0.0);
    }
}
