//! Email subjects and HTML fragments for a ticker's digest

use crate::mailer::EmailMessage;
use crate::ticker::Ticker;
use std::error::Error;

pub fn summary_subject(ticker: &Ticker) -> String {
    format!("{ticker} Financial Summary")
}

pub fn failure_subject(ticker: &Ticker) -> String {
    format!("{ticker} Analysis Failed")
}

/// The model's text is embedded verbatim, Markdown included
pub fn summary_html(ticker: &Ticker, summary: &str) -> String {
    format!("<p><b>{ticker}:</b><br>{summary}</p><hr>")
}

pub fn failure_html(ticker: &Ticker, error: &(dyn Error + 'static)) -> String {
    format!("<p><b>{ticker}:</b> ❌ Failed due to {}</p><hr>", describe_error(error))
}

/// `error` followed by each underlying cause, `outer: inner: root`
///
/// Causes whose text already appears in the message are skipped.
pub fn describe_error(error: &(dyn Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

/// Success notification for `ticker`
pub fn summary_email(ticker: &Ticker, summary: &str) -> EmailMessage {
    EmailMessage::new(summary_subject(ticker), summary_html(ticker, summary))
}

/// Failure notification for `ticker`
pub fn failure_email(ticker: &Ticker, error: &(dyn Error + 'static)) -> EmailMessage {
    EmailMessage::new(failure_subject(ticker), failure_html(ticker, error))
}
