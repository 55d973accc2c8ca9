//! Emailed financial digests for a list of tickers
//!
//! For each ticker an LLM agent with market data and web search tools writes a
//! short analysis, which is then emailed as HTML. Tickers are handled strictly
//! one after another and a failure on one never stops the rest.
//!
//! ```text
//! Orchestrator ──▶ FinancialAnalyst ──▶ Groq + MarketData + WebSearch
//!      │
//!      └────────▶ SmtpMailer ──▶ SMTP relay
//! ```

pub mod analyst;
pub mod config;
pub mod error;
pub mod logging;
pub mod mailer;
pub mod orchestrator;
pub mod report;
pub mod ticker;

pub use analyst::{Analyst, AnalystSettings, FinancialAnalyst};
pub use config::DigestConfig;
pub use error::{AnalysisError, MailError};
pub use mailer::{EmailMessage, Mailer, SmtpMailer};
pub use orchestrator::{Orchestrator, RunSummary, TickerOutcome};
pub use ticker::Ticker;
