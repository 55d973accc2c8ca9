//! Ticker symbols as typed by the user

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, BufRead, Write};

pub const PROMPT: &str = "Enter tickers (comma-separated): ";

/// An upper-cased, trimmed ticker symbol
///
/// No format check is made; whatever the user typed between commas is kept,
/// including empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    /// Split a comma-separated list, keeping order, duplicates and blanks
    pub fn parse_list(input: &str) -> Vec<Self> {
        input.split(',').map(Self::new).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Write [`PROMPT`] to `output` and parse one line from `input`
///
/// End of input counts as an empty line, which yields a single empty ticker.
pub fn prompt_tickers(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<Vec<Ticker>> {
    output.write_all(PROMPT.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(Ticker::parse_list(&line))
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
