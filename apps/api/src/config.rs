use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::search::provider::SafeSearch;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                  (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub rust_log: String,
    /// Results per search / refresh.
    pub search_max_results: usize,
    /// Images returned by one load-more request.
    pub load_more_batch: usize,
    /// Results requested from the provider for each load-more keyword variant.
    pub load_more_per_variant: usize,
    pub search_region: String,
    pub safesearch: SafeSearch,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let safesearch = match lookup("SAFESEARCH") {
            Some(raw) => SafeSearch::parse(&raw)
                .ok_or_else(|| anyhow!("SAFESEARCH must be one of on, moderate, off (got '{raw}')"))?,
            None => SafeSearch::Moderate,
        };

        Ok(Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 5000)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            search_max_results: parse_or(&lookup, "SEARCH_MAX_RESULTS", 20)?,
            load_more_batch: parse_or(&lookup, "LOAD_MORE_BATCH", 10)?,
            load_more_per_variant: parse_or(&lookup, "LOAD_MORE_PER_VARIANT", 30)?,
            search_region: lookup("SEARCH_REGION").unwrap_or_else(|| "wt-wt".to_string()),
            safesearch,
            fetch_timeout_secs: parse_or(&lookup, "FETCH_TIMEOUT_SECS", 10)?,
            user_agent: lookup("USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
