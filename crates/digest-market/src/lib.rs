//! Market data and web search capabilities
//!
//! Two capability families are exposed to the analysis agent:
//!
//! - [`MarketData`]: latest price (Yahoo Finance), analyst recommendations,
//!   fundamentals and company news (Alpha Vantage)
//! - [`WebSearch`]: general web search and news headlines (DuckDuckGo)
//!
//! The [`tools`] module wraps both as agent tools. Anything implementing the
//! traits can be plugged in, which is how tests substitute fakes.

pub mod api;
pub mod config;
pub mod error;
pub mod market;
pub mod search;
pub mod tools;
pub mod types;

pub use config::MarketConfig;
pub use error::{MarketError, Result};
pub use market::{MarketData, MarketDataClient};
pub use search::WebSearch;
pub use tools::MarketToolset;
pub use types::{AnalystRecommendations, Fundamentals, NewsItem, SearchHit, StockQuote};
