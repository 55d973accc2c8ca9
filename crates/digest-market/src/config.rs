//! Configuration for market data and search clients

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings shared by the market data and search clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Enables recommendations, fundamentals and news
    pub alpha_vantage_api_key: Option<String>,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl MarketConfig {
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Whether the Alpha Vantage backed lookups can run
    pub fn has_alpha_vantage(&self) -> bool {
        self.alpha_vantage_api_key.is_some()
    }
}

/// Builder for [`MarketConfig`]
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    alpha_vantage_api_key: Option<String>,
    request_timeout: Option<Duration>,
}

impl MarketConfigBuilder {
    /// Set the Alpha Vantage key; blank keys are ignored
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !key.trim().is_empty() {
            self.alpha_vantage_api_key = Some(key.trim().to_string());
        }
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> MarketConfig {
        let defaults = MarketConfig::default();
        MarketConfig {
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarketConfig::default();
        assert!(!config.has_alpha_vantage());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder() {
        let config = MarketConfig::builder()
            .alpha_vantage_api_key(" demo ")
            .request_timeout(Duration::from_secs(5))
            .build();

        assert_eq!(config.alpha_vantage_api_key.as_deref(), Some("demo"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_key_is_ignored() {
        let config = MarketConfig::builder().alpha_vantage_api_key("   ").build();
        assert!(!config.has_alpha_vantage());
    }
}
