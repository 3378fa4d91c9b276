//! Configuration loading from environment.

use std::env;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/currency.db?mode=rwc";
const DEFAULT_API_URL: &str = "https://api.currencyapi.com";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub database_url: String,
    pub api_url: String,
    pub api_key: String,
    pub fetch_timeout: Duration,
    /// Emit logs as JSON lines (`LOG_FORMAT=json`).
    pub log_json: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let api_url = lookup("CURRENCY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let api_key = lookup("CURRENCY_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("CURRENCY_API_KEY environment variable is required"))?;

        let fetch_timeout_secs: u64 = match lookup("FETCH_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("FETCH_TIMEOUT_SECS must be whole seconds: {e}"))?,
            None => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        let log_json = lookup("LOG_FORMAT").is_some_and(|format| format.eq_ignore_ascii_case("json"));

        Ok(Self {
            database_url,
            api_url,
            api_key,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            log_json,
        })
    }
}
