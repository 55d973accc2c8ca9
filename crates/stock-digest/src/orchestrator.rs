//! Runs the analyze-then-email pipeline over a ticker list

use crate::analyst::Analyst;
use crate::mailer::Mailer;
use crate::report;
use crate::ticker::Ticker;
use serde::Serialize;
use tracing::{error, info};

/// What happened to one ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerOutcome {
    pub analyzed: bool,
    pub emailed: bool,
}

/// Counters for a whole run; informational only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub tickers: usize,
    pub analyses_failed: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: TickerOutcome) {
        self.tickers += 1;
        if !outcome.analyzed {
            self.analyses_failed += 1;
        }
        if outcome.emailed {
            self.emails_sent += 1;
        } else {
            self.emails_failed += 1;
        }
    }
}

/// Processes tickers one at a time: analysis, then exactly one email
pub struct Orchestrator<A, M> {
    analyst: A,
    mailer: M,
}

impl<A: Analyst, M: Mailer> Orchestrator<A, M> {
    pub fn new(analyst: A, mailer: M) -> Self {
        Self { analyst, mailer }
    }

    /// Every ticker is attempted, in order, whatever happens to the others
    pub async fn run(&self, tickers: &[Ticker]) -> RunSummary {
        let mut summary = RunSummary::default();

        for ticker in tickers {
            let outcome = self.process(ticker).await;
            summary.record(outcome);
        }

        info!(
            tickers = summary.tickers,
            analyses_failed = summary.analyses_failed,
            emails_sent = summary.emails_sent,
            emails_failed = summary.emails_failed,
            "Run complete"
        );
        summary
    }

    pub async fn process(&self, ticker: &Ticker) -> TickerOutcome {
        info!("Analyzing {ticker}");

        let (message, analyzed) = match self.analyst.analyze(ticker).await {
            Ok(analysis) => (report::summary_email(ticker, &analysis), true),
            Err(e) => {
                error!(ticker = %ticker, error = %e, "Analysis failed");
                (report::failure_email(ticker, &e), false)
            }
        };

        let emailed = match self.mailer.send(&message).await {
            Ok(()) => true,
            Err(e) => {
                error!(ticker = %ticker, "Failed to send email: {e}");
                false
            }
        };

        TickerOutcome { analyzed, emailed }
    }
}
