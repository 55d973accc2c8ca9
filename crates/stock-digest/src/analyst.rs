//! The financial analyst agent
//!
//! [`FinancialAnalyst`] is a tool-calling agent with the market data tools plus
//! web search and news. Every [`Analyst::analyze`] call is a fresh
//! conversation; the model's final Markdown answer is returned as is.

use crate::error::AnalysisError;
use crate::ticker::Ticker;
use async_trait::async_trait;
use digest_agent::{AgentExecutor, ToolRegistry};
use digest_llm::LlmProvider;
use digest_llm::providers::DEFAULT_GROQ_MODEL;
use digest_market::{MarketData, MarketToolset, WebSearch, tools};
use std::sync::Arc;
use tracing::{debug, info};

pub const AGENT_NAME: &str = "Autonomous Financial Analyst";

const ROLE: &str = "You are an autonomous AI financial analyst. Retrieve, analyze, and summarize \
                    stock data, fundamentals, news, and analyst insights. Limit the analysis to \
                    key points to reduce overload.";

const INSTRUCTIONS: [&str; 5] = [
    "Use concise tables for data like prices or fundamentals.",
    "Summarize only the top 3 news articles.",
    "Limit analysis to ~2000 tokens per request.",
    "Avoid repeating known information.",
    "Cite dates and sources.",
];

/// Produces a written analysis for one ticker
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Analyst: Send + Sync {
    async fn analyze(&self, ticker: &Ticker) -> Result<String, AnalysisError>;
}

/// The request sent to the agent for `ticker`
pub fn build_prompt(ticker: &Ticker) -> String {
    format!(
        "Provide a brief financial analysis of {ticker}: Include current stock price, analyst \
         recommendations, top 3 fundamentals, and most recent news."
    )
}

/// Role, numbered instructions and the output format
pub fn system_prompt() -> String {
    let instructions: Vec<String> = INSTRUCTIONS
        .iter()
        .enumerate()
        .map(|(i, instruction)| format!("{}. {instruction}", i + 1))
        .collect();

    format!(
        "{AGENT_NAME}\n\n{ROLE}\n\nInstructions:\n{}\n\nFormat the response in Markdown.",
        instructions.join("\n")
    )
}

/// Model parameters and tool selection for [`FinancialAnalyst`]
#[derive(Debug, Clone)]
pub struct AnalystSettings {
    pub model: String,
    pub max_tokens: usize,
    pub temperature: Option<f32>,
    /// Model round-trips allowed per ticker
    pub max_iterations: usize,
    pub tools: MarketToolset,
}

impl Default for AnalystSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_GROQ_MODEL.to_string(),
            max_tokens: 2048,
            temperature: None,
            max_iterations: 8,
            tools: MarketToolset::all(),
        }
    }
}

impl AnalystSettings {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// [`Analyst`] backed by an LLM agent with market data and web search tools
pub struct FinancialAnalyst {
    executor: AgentExecutor,
}

impl FinancialAnalyst {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        market: Arc<dyn MarketData>,
        search: Arc<dyn WebSearch>,
        settings: AnalystSettings,
    ) -> Result<Self, AnalysisError> {
        let mut registry = ToolRegistry::new();
        settings.tools.register(&mut registry, &market);
        tools::register_search(&mut registry, search);

        debug!(
            provider = provider.name(),
            model = %settings.model,
            tools = ?registry.names(),
            "Building analyst agent"
        );

        let mut builder = AgentExecutor::builder()
            .provider(provider)
            .tools(registry)
            .model(settings.model)
            .system_prompt(system_prompt())
            .max_tokens(settings.max_tokens)
            .max_iterations(settings.max_iterations);
        if let Some(temperature) = settings.temperature {
            builder = builder.temperature(temperature);
        }

        Ok(Self {
            executor: builder.build()?,
        })
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.executor.tools().names()
    }
}

#[async_trait]
impl Analyst for FinancialAnalyst {
    async fn analyze(&self, ticker: &Ticker) -> Result<String, AnalysisError> {
        let summary = self.executor.run(build_prompt(ticker)).await?;
        info!(ticker = %ticker, chars = summary.len(), "Analysis complete");
        Ok(summary)
    }
}
