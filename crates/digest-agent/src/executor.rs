//! Agent executor
//!
//! The executor implements the tool-calling loop:
//! 1. Send the conversation and the tool definitions to the model
//! 2. If the model asked for tools, run them in order and append the results
//! 3. Repeat until the model answers with text or the iteration budget runs out

use crate::{AgentError, Result, ToolRegistry};
use digest_llm::{CompletionRequest, ContentBlock, LlmProvider, Message, StopReason};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Model parameters and loop budget for one agent
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Upper bound on model round-trips per run
    pub max_iterations: usize,

    pub model: String,

    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 8,
            model: digest_llm::providers::DEFAULT_GROQ_MODEL.to_string(),
            system_prompt: None,
            max_tokens: 2048,
            temperature: None,
        }
    }
}

/// Runs the model/tool loop for a single prompt
///
/// Every [`AgentExecutor::run`] starts a fresh conversation; nothing is
/// carried over between runs.
pub struct AgentExecutor {
    provider: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
    config: ExecutorConfig,
}

impl AgentExecutor {
    pub fn new(provider: Arc<dyn LlmProvider>, tools: ToolRegistry, config: ExecutorConfig) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the loop for `prompt` and return the model's final text
    pub async fn run(&self, prompt: impl Into<String>) -> Result<String> {
        let mut conversation = vec![Message::user(prompt)];
        let definitions = self.tools.definitions();

        for iteration in 1..=self.config.max_iterations {
            info!(
                iteration,
                max_iterations = self.config.max_iterations,
                provider = self.provider.name(),
                model = %self.config.model,
                tool_count = definitions.len(),
                "Sending request to LLM"
            );

            let mut builder = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .max_tokens(self.config.max_tokens)
                .tools(definitions.clone());
            if let Some(system) = &self.config.system_prompt {
                builder = builder.system(system.clone());
            }
            if let Some(temperature) = self.config.temperature {
                builder = builder.temperature(temperature);
            }

            let response = self.provider.complete(builder.build()).await?;

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            match response.stop_reason {
                StopReason::ToolUse if response.message.has_tool_uses() => {
                    let results = self.execute_tools(&response.message).await;
                    conversation.push(response.message);
                    conversation.extend(results);
                }
                StopReason::MaxTokens => {
                    warn!("Response truncated at the max token limit");
                    return Ok(final_text(&response.message));
                }
                _ => {
                    let text = final_text(&response.message);
                    info!(iteration, response_length = text.len(), "Agent completed");
                    return Ok(text);
                }
            }
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "Iteration budget exhausted"
        );
        Err(AgentError::IterationLimit(self.config.max_iterations))
    }

    /// Run every tool requested in `message`. Failures, including unknown
    /// tool names, become error results so the model can react to them.
    async fn execute_tools(&self, message: &Message) -> Vec<Message> {
        let mut results = Vec::new();

        for block in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = block else {
                continue;
            };

            let Some(tool) = self.tools.get(name) else {
                warn!(tool_name = %name, "Model requested an unknown tool");
                results.push(Message::tool_error(
                    id.clone(),
                    format!("Error: unknown tool '{name}'. Available tools: {}", self.tools.names().join(", ")),
                ));
                continue;
            };

            debug!(tool_name = %name, tool_id = %id, input = %input, "Executing tool");
            let started = Instant::now();

            match tool.execute(input.clone()).await {
                Ok(output) => {
                    let output = output.to_string();
                    info!(
                        tool_name = %name,
                        duration_ms = started.elapsed().as_millis() as u64,
                        result_length = output.len(),
                        "Tool execution succeeded"
                    );
                    results.push(Message::tool_result(id.clone(), output));
                }
                Err(e) => {
                    warn!(
                        tool_name = %name,
                        duration_ms = started.elapsed().as_millis() as u64,
                        error = %e,
                        "Tool execution failed"
                    );
                    results.push(Message::tool_error(id.clone(), format!("Error: {e}")));
                }
            }
        }

        results
    }
}

fn final_text(message: &Message) -> String {
    message.text().unwrap_or_default().to_string()
}

/// Builder for [`AgentExecutor`]
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: ExecutorConfig,
}

impl AgentExecutorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: ExecutorConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Initialization("Provider not set".to_string()))?;
        if self.config.max_iterations == 0 {
            return Err(AgentError::Initialization(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        Ok(AgentExecutor::new(provider, self.tools, self.config))
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tool;
    use async_trait::async_trait;
    use digest_llm::{CompletionResponse, LlmError, MessageContent, TokenUsage};
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records every request
    struct ScriptedProvider {
        responses: Mutex<VecDeque<digest_llm::Result<CompletionResponse>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<digest_llm::Result<CompletionResponse>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> digest_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::RequestFailed("script exhausted".into())))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct PriceTool;

    #[async_trait]
    impl Tool for PriceTool {
        async fn execute(&self, params: Value) -> crate::Result<Value> {
            match params["symbol"].as_str() {
                Some("AAPL") => Ok(json!({"symbol": "AAPL", "price": 150.0})),
                _ => Err(AgentError::Tool("unknown symbol".into())),
            }
        }

        fn name(&self) -> &str {
            "get_current_stock_price"
        }

        fn description(&self) -> &str {
            "Latest price"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {"symbol": {"type": "string"}}})
        }
    }

    fn text(reply: &str) -> digest_llm::Result<CompletionResponse> {
        Ok(CompletionResponse {
            message: Message::assistant(reply),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        })
    }

    fn tool_call(id: &str, name: &str, input: Value) -> digest_llm::Result<CompletionResponse> {
        Ok(CompletionResponse {
            message: Message::assistant_blocks(vec![ContentBlock::ToolUse {
                id: id.into(),
                name: name.into(),
                input,
            }]),
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        })
    }

    fn executor(provider: Arc<ScriptedProvider>, max_iterations: usize) -> AgentExecutor {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(PriceTool));
        AgentExecutor::builder()
            .provider(provider)
            .tools(tools)
            .system_prompt("You are an analyst")
            .max_iterations(max_iterations)
            .build()
            .unwrap()
    }

    fn tool_result_of(message: &Message) -> (String, Option<bool>) {
        match &message.content {
            Some(MessageContent::Blocks(blocks)) => match &blocks[0] {
                ContentBlock::ToolResult {
                    content, is_error, ..
                } => (content.clone(), *is_error),
                other => panic!("Expected tool result, got {other:?}"),
            },
            other => panic!("Expected blocks, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let provider = ScriptedProvider::new(vec![text("Price: $150. Buy rating.")]);
        let agent = executor(provider.clone(), 4);

        let answer = agent.run("Analyze AAPL").await.unwrap();
        assert_eq!(answer, "Price: $150. Buy rating.");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system.as_deref(), Some("You are an analyst"));
        assert_eq!(requests[0].messages[0].text(), Some("Analyze AAPL"));
        assert_eq!(requests[0].tools.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_tool_result_is_fed_back() {
        let provider = ScriptedProvider::new(vec![
            tool_call("call_1", "get_current_stock_price", json!({"symbol": "AAPL"})),
            text("AAPL trades at $150"),
        ]);
        let agent = executor(provider.clone(), 4);

        let answer = agent.run("Analyze AAPL").await.unwrap();
        assert_eq!(answer, "AAPL trades at $150");

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        let second = &requests[1].messages;
        assert_eq!(second.len(), 3);
        assert!(second[1].has_tool_uses());
        let (content, is_error) = tool_result_of(&second[2]);
        assert!(content.contains("150"));
        assert_eq!(is_error, None);
    }

    #[tokio::test]
    async fn test_tool_failure_and_unknown_tool_become_error_results() {
        let provider = ScriptedProvider::new(vec![
            tool_call("call_1", "get_current_stock_price", json!({"symbol": "ZZZZ"})),
            tool_call("call_2", "get_weather", json!({})),
            text("Could not find data"),
        ]);
        let agent = executor(provider.clone(), 5);

        assert_eq!(agent.run("Analyze ZZZZ").await.unwrap(), "Could not find data");

        let requests = provider.requests();
        let (content, is_error) = tool_result_of(&requests[1].messages[2]);
        assert_eq!(content, "Error: Tool failed: unknown symbol");
        assert_eq!(is_error, Some(true));

        let (content, is_error) = tool_result_of(&requests[2].messages[4]);
        assert!(content.contains("unknown tool 'get_weather'"));
        assert!(content.contains("get_current_stock_price"));
        assert_eq!(is_error, Some(true));
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let provider = ScriptedProvider::new(vec![
            tool_call("a", "get_current_stock_price", json!({"symbol": "AAPL"})),
            tool_call("b", "get_current_stock_price", json!({"symbol": "AAPL"})),
        ]);
        let agent = executor(provider.clone(), 2);

        let err = agent.run("loop").await.unwrap_err();
        assert!(matches!(err, AgentError::IterationLimit(2)));
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = ScriptedProvider::new(vec![Err(LlmError::AuthenticationFailed)]);
        let agent = executor(provider, 3);

        let err = agent.run("Analyze AAPL").await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(LlmError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn test_max_tokens_returns_partial_text() {
        let provider = ScriptedProvider::new(vec![Ok(CompletionResponse {
            message: Message::assistant("| Metric | Value |"),
            stop_reason: StopReason::MaxTokens,
            usage: TokenUsage::default(),
        })]);
        let agent = executor(provider, 3);

        assert_eq!(agent.run("Analyze AAPL").await.unwrap(), "| Metric | Value |");
    }

    #[tokio::test]
    async fn test_each_run_starts_fresh() {
        let provider = ScriptedProvider::new(vec![text("first"), text("second")]);
        let agent = executor(provider.clone(), 3);

        agent.run("Analyze AAPL").await.unwrap();
        agent.run("Analyze AAPL").await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].messages.len(), 1);
    }

    #[test]
    fn test_builder_requires_provider() {
        let result = AgentExecutorBuilder::new().model("m").build();
        assert!(matches!(result, Err(AgentError::Initialization(_))));
    }

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert_eq!(config.max_iterations, 8);
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert!(config.system_prompt.is_none());
    }
}
