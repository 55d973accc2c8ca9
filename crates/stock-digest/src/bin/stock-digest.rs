//! stock-digest CLI
//!
//! Analyzes each ticker with an LLM agent and emails the result.
//!
//! # Usage
//!
//! ```bash
//! # Credentials (or put them in .env)
//! export GROQ_API_KEY="gsk_..."
//! export EMAIL_USER="bot@gmail.com"
//! export EMAIL_PASSWORD="app-password"
//! export EMAIL_RECEIVER="me@example.com"
//! export ALPHA_VANTAGE_API_KEY="..."   # recommendations, fundamentals, news
//!
//! cargo run --bin stock-digest -- --tickers "AAPL, TSLA"
//! ```

use anyhow::Context;
use clap::Parser;
use digest_llm::providers::{GroqConfig, GroqProvider};
use digest_market::MarketDataClient;
use digest_market::api::DuckDuckGoSearch;
use secrecy::ExposeSecret;
use std::io;
use std::sync::Arc;
use stock_digest::config::load_dotenv;
use stock_digest::logging::init_tracing;
use stock_digest::ticker::prompt_tickers;
use stock_digest::{
    AnalystSettings, DigestConfig, FinancialAnalyst, Orchestrator, SmtpMailer, Ticker,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "stock-digest", version, about = "Email an AI-written financial digest per ticker")]
struct Cli {
    /// Comma-separated tickers; prompts on stdin when omitted
    #[arg(short, long)]
    tickers: Option<String>,

    /// Groq model id (overrides GROQ_MODEL)
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = DigestConfig::from_env();

    let tickers = match cli.tickers {
        Some(list) => Ticker::parse_list(&list),
        None => prompt_tickers(&mut io::stdin().lock(), &mut io::stdout())
            .context("Failed to read tickers from stdin")?,
    };

    let model = cli.model.unwrap_or_else(|| config.llm.model.clone());
    info!(
        model = %model,
        api_base = %config.llm.api_base,
        smtp_host = %config.mail.host,
        alpha_vantage = config.market.has_alpha_vantage(),
        tickers = tickers.len(),
        "Starting stock-digest"
    );

    let groq = GroqProvider::with_config(
        GroqConfig::new(config.credentials.groq_api_key.expose_secret())
            .with_api_base(config.llm.api_base.clone())
            .with_timeout(config.llm.timeout_secs),
    )
    .context("Failed to create Groq client")?;
    let market = MarketDataClient::new(&config.market).context("Failed to create market data client")?;
    let search =
        DuckDuckGoSearch::new(config.market.request_timeout).context("Failed to create search client")?;

    let analyst = FinancialAnalyst::new(
        Arc::new(groq),
        Arc::new(market),
        Arc::new(search),
        AnalystSettings::default().with_model(model),
    )
    .context("Failed to build analyst agent")?;
    info!(tools = ?analyst.tool_names(), "Analyst ready");
    let mailer = SmtpMailer::new(&config.credentials, &config.mail);

    Orchestrator::new(analyst, mailer).run(&tickers).await;

    Ok(())
}
