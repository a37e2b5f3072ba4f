//! Process configuration, read once from the environment at startup

use crate::state_machine::Choices;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_LEDGER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Ledger endpoint settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub endpoint: String,
    pub token: String,
    pub timeout: Duration,
    /// Treat non-2xx responses as failed submissions
    pub strict_status: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub bot_token: String,
    pub webhook_url: String,
    pub port: u16,
    pub choices: Choices,
    pub ledger: LedgerConfig,
    /// Chat that receives payload notifications
    pub admin_chat_id: Option<i64>,
    /// Idle expiry for abandoned drafts, disabled when unset
    pub draft_ttl: Option<Duration>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let timeout_secs = parse_or(&lookup, "LEDGER_TIMEOUT_SECS", DEFAULT_LEDGER_TIMEOUT_SECS)?;
        let strict_status = parse_or(&lookup, "LEDGER_STRICT_STATUS", false)?;
        let admin_chat_id = parse_opt(&lookup, "ADMIN_CHAT_ID")?;
        let draft_ttl = parse_opt::<u64>(&lookup, "DRAFT_TTL_SECS")?.map(Duration::from_secs);

        Ok(Self {
            bot_token: required("TG_BOT_TOKEN")?,
            webhook_url: required("WEBHOOK_URL")?,
            port,
            choices: Choices::new(
                split_labels(&required("CATEGORIES")?),
                split_labels(&required("SOURCES")?),
            ),
            ledger: LedgerConfig {
                endpoint: required("FF_API_ENDPOINT")?,
                token: required("FF_API_TOKEN")?,
                timeout: Duration::from_secs(timeout_secs),
                strict_status,
            },
            admin_chat_id,
            draft_ttl,
        })
    }
}

/// Comma-separated labels, trimmed, order kept, blanks dropped
pub fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_opt<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    Ok(parse_opt(lookup, name)?.unwrap_or(default))
}
