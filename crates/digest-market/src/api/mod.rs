//! Provider clients

pub mod alpha_vantage;
pub mod duckduckgo;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageClient;
pub use duckduckgo::DuckDuckGoSearch;
pub use yahoo::YahooFinanceClient;
