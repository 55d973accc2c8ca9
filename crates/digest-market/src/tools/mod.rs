//! Agent tools backed by the market data and search capabilities

mod market;
mod search;

pub use market::{AnalystRecommendationsTool, CompanyNewsTool, StockFundamentalsTool, StockPriceTool};
pub use search::{WebNewsTool, WebSearchTool};

use crate::market::MarketData;
use crate::search::WebSearch;
use digest_agent::ToolRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which market data tools an agent gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct MarketToolset {
    pub stock_price: bool,
    pub analyst_recommendations: bool,
    pub stock_fundamentals: bool,
    pub company_news: bool,
}

impl Default for MarketToolset {
    fn default() -> Self {
        Self::all()
    }
}

impl MarketToolset {
    pub const fn all() -> Self {
        Self {
            stock_price: true,
            analyst_recommendations: true,
            stock_fundamentals: true,
            company_news: true,
        }
    }

    /// Add the enabled market tools to `registry`
    pub fn register(&self, registry: &mut ToolRegistry, market: &Arc<dyn MarketData>) {
        if self.stock_price {
            registry.register(Arc::new(StockPriceTool::new(Arc::clone(market))));
        }
        if self.analyst_recommendations {
            registry.register(Arc::new(AnalystRecommendationsTool::new(Arc::clone(market))));
        }
        if self.stock_fundamentals {
            registry.register(Arc::new(StockFundamentalsTool::new(Arc::clone(market))));
        }
        if self.company_news {
            registry.register(Arc::new(CompanyNewsTool::new(Arc::clone(market))));
        }
    }
}

/// Add the web search and web news tools to `registry`
pub fn register_search(registry: &mut ToolRegistry, search: Arc<dyn WebSearch>) {
    registry.register(Arc::new(WebSearchTool::new(Arc::clone(&search))));
    registry.register(Arc::new(WebNewsTool::new(search)));
}
