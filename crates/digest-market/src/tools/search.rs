//! `duckduckgo_search` and `duckduckgo_news` tools

use async_trait::async_trait;
use digest_agent::{AgentError, Result as AgentResult, Tool};
use digest_llm::tools::schema;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use super::market::count_schema;
use crate::search::WebSearch;

const DEFAULT_MAX_RESULTS: usize = 5;
const MAX_RESULTS_CAP: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default)]
    max_results: Option<usize>,
}

impl SearchParams {
    fn parse(params: Value) -> AgentResult<(String, usize)> {
        let params: Self = serde_json::from_value(params)
            .map_err(|e| AgentError::Tool(format!("Invalid parameters: {e}")))?;

        let query = params.query.trim();
        if query.is_empty() {
            return Err(AgentError::Tool("Search query must not be empty".to_string()));
        }

        let max_results = params
            .max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(1, MAX_RESULTS_CAP);
        Ok((query.to_string(), max_results))
    }
}

fn search_schema() -> Value {
    schema::object(
        json!({
            "query": schema::string("Search query"),
            "max_results": count_schema("Maximum number of results (default 5, max 10)", MAX_RESULTS_CAP),
        }),
        &["query"],
    )
}

/// General web search for context the market tools don't cover
pub struct WebSearchTool {
    search: Arc<dyn WebSearch>,
}

impl WebSearchTool {
    pub fn new(search: Arc<dyn WebSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let (query, max_results) = SearchParams::parse(params)?;
        let hits = self.search.search(&query, max_results).await?;

        Ok(json!({
            "query": query,
            "count": hits.len(),
            "results": hits,
        }))
    }

    fn name(&self) -> &'static str {
        "duckduckgo_search"
    }

    fn description(&self) -> &'static str {
        "Search the web with DuckDuckGo. Use for recent events or context not covered by the market data tools."
    }

    fn input_schema(&self) -> Value {
        search_schema()
    }
}

/// Recent news headlines for any query, no API key needed
pub struct WebNewsTool {
    search: Arc<dyn WebSearch>,
}

impl WebNewsTool {
    pub fn new(search: Arc<dyn WebSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Tool for WebNewsTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let (query, max_results) = SearchParams::parse(params)?;
        let news = self.search.news(&query, max_results).await?;

        let articles: Vec<Value> = news
            .iter()
            .map(|item| {
                json!({
                    "title": item.title,
                    "url": item.url,
                    "source": item.source,
                    "published_at": item.published_at.map(|t| t.to_rfc3339()),
                    "summary": item.summary,
                })
            })
            .collect();

        Ok(json!({
            "query": query,
            "count": articles.len(),
            "articles": articles,
        }))
    }

    fn name(&self) -> &'static str {
        "duckduckgo_news"
    }

    fn description(&self) -> &'static str {
        "Search recent news articles with DuckDuckGo. Works without an Alpha Vantage key."
    }

    fn input_schema(&self) -> Value {
        search_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarketError;
    use crate::search::MockWebSearch;
    use crate::types::{NewsItem, SearchHit};
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_search_tool() {
        let mut search = MockWebSearch::new();
        search
            .expect_search()
            .withf(|query, max| query == "Apple earnings" && *max == DEFAULT_MAX_RESULTS)
            .times(1)
            .returning(|_, _| {
                Ok(vec![SearchHit {
                    title: "Apple reports record quarter".into(),
                    url: "https://example.com/apple".into(),
                    snippet: "Revenue rose...".into(),
                }])
            });

        let tool = WebSearchTool::new(Arc::new(search));
        let out = tool.execute(json!({"query": " Apple earnings "})).await.unwrap();

        assert_eq!(out["count"], 1);
        assert_eq!(out["results"][0]["url"], "https://example.com/apple");
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let tool = WebSearchTool::new(Arc::new(MockWebSearch::new()));
        let err = tool.execute(json!({"query": "  "})).await.unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[tokio::test]
    async fn test_search_failure_is_a_tool_error() {
        let mut search = MockWebSearch::new();
        search
            .expect_search()
            .withf(|_, max| *max == MAX_RESULTS_CAP)
            .returning(|_, _| Err(MarketError::provider("DuckDuckGo", "HTTP error: 503")));

        let tool = WebSearchTool::new(Arc::new(search));
        let err = tool
            .execute(json!({"query": "NVDA", "max_results": 40}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Tool failed: DuckDuckGo error: HTTP error: 503");
    }

    #[tokio::test]
    async fn test_news_tool() {
        let mut search = MockWebSearch::new();
        search
            .expect_news()
            .withf(|query, max| query == "Tesla deliveries" && *max == 2)
            .times(1)
            .returning(|_, _| {
                Ok(vec![NewsItem {
                    title: "Tesla deliveries top estimates".into(),
                    url: "https://news.example/tsla".into(),
                    source: Some("Bloomberg".into()),
                    published_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 14, 0, 0).unwrap()),
                    summary: Some("Deliveries rose.".into()),
                    sentiment: None,
                }])
            });

        let tool = WebNewsTool::new(Arc::new(search));
        let out = tool
            .execute(json!({"query": "Tesla deliveries", "max_results": 2}))
            .await
            .unwrap();

        assert_eq!(out["count"], 1);
        assert_eq!(out["articles"][0]["source"], "Bloomberg");
        assert_eq!(out["articles"][0]["published_at"], "2024-01-02T14:00:00+00:00");
    }

    #[test]
    fn test_search_tools_share_schema() {
        let search: Arc<dyn WebSearch> = Arc::new(MockWebSearch::new());
        let web = WebSearchTool::new(Arc::clone(&search)).input_schema();
        let news = WebNewsTool::new(search).input_schema();

        assert_eq!(web, news);
        assert_eq!(web["required"], json!(["query"]));
        assert_eq!(web["properties"]["max_results"]["maximum"], 10);
    }
}
