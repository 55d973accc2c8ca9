//! Web search capability

use crate::error::Result;
use crate::types::{NewsItem, SearchHit};
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// At most `max_results` hits, best first. No hits is not an error.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;

    /// At most `max_results` news articles, newest first
    async fn news(&self, query: &str, max_results: usize) -> Result<Vec<NewsItem>>;
}
