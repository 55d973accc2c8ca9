//! Credentials and settings from the environment
//!
//! Nothing here fails: a missing credential becomes an empty string (and a
//! warning) so the first component that needs it reports the problem.

use digest_llm::providers::{DEFAULT_GROQ_API_BASE, DEFAULT_GROQ_MODEL};
use digest_market::MarketConfig;
use secrecy::SecretString;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MARKET_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Load `.env` into the process environment if one exists
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) => debug!(error = %e, "No .env loaded"),
    }
}

/// The four values the program cannot do anything useful without
#[derive(Debug, Clone)]
pub struct Credentials {
    pub groq_api_key: SecretString,
    /// Sender address and SMTP login
    pub email_user: String,
    pub email_password: SecretString,
    pub email_receiver: String,
}

/// Language model settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_GROQ_MODEL.to_string(),
            api_base: DEFAULT_GROQ_API_BASE.to_string(),
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

/// SMTP relay settings; implicit TLS on `port`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
        }
    }
}

/// Everything the pipeline needs, built once at startup
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub credentials: Credentials,
    pub llm: LlmSettings,
    pub mail: MailSettings,
    pub market: MarketConfig,
}

impl DigestConfig {
    /// Read the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns `None` for unset keys
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let required = |key: &str| {
            lookup(key).unwrap_or_else(|| {
                warn!(variable = key, "Environment variable not set; using an empty value");
                String::new()
            })
        };

        let credentials = Credentials {
            groq_api_key: required("GROQ_API_KEY").into(),
            email_user: required("EMAIL_USER"),
            email_password: required("EMAIL_PASSWORD").into(),
            email_receiver: required("EMAIL_RECEIVER"),
        };

        let llm_defaults = LlmSettings::default();
        let llm = LlmSettings {
            model: non_blank(&lookup, "GROQ_MODEL").unwrap_or(llm_defaults.model),
            api_base: non_blank(&lookup, "GROQ_API_BASE").unwrap_or(llm_defaults.api_base),
            timeout_secs: parsed(&lookup, "LLM_TIMEOUT_SECS", llm_defaults.timeout_secs),
        };

        let mail_defaults = MailSettings::default();
        let mail = MailSettings {
            host: non_blank(&lookup, "SMTP_HOST").unwrap_or(mail_defaults.host),
            port: parsed(&lookup, "SMTP_PORT", mail_defaults.port),
        };

        let mut market = MarketConfig::builder().request_timeout(Duration::from_secs(parsed(
            &lookup,
            "MARKET_TIMEOUT_SECS",
            DEFAULT_MARKET_TIMEOUT_SECS,
        )));
        if let Some(key) = lookup("ALPHA_VANTAGE_API_KEY") {
            market = market.alpha_vantage_api_key(key);
        }

        Self {
            credentials,
            llm,
            mail,
            market: market.build(),
        }
    }
}

fn non_blank(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed<T: FromStr + Copy + std::fmt::Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    let Some(raw) = non_blank(lookup, key) else {
        return default;
    };
    raw.parse().unwrap_or_else(|_| {
        warn!(variable = key, value = %raw, default = %default, "Invalid value; using default");
        default
    })
}
