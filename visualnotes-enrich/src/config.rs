//! Enrichment settings read from the environment.

use std::time::Duration;

pub const DEFAULT_UNSPLASH_API_URL: &str = "https://api.unsplash.com";
pub const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_TRIVIA_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_CONCURRENCY: usize = 10;

pub const UNSPLASH_KEY_VAR: &str = "UNSPLASH_ACCESS_KEY";
pub const ANTHROPIC_KEY_VAR: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichConfig {
    pub unsplash_access_key: Option<String>,
    pub unsplash_api_url: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_url: String,
    pub trivia_model: String,
    /// Deadline for each individual fetch
    pub timeout: Duration,
    /// Maximum fetches in flight at once
    pub concurrency: usize,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            unsplash_access_key: None,
            unsplash_api_url: DEFAULT_UNSPLASH_API_URL.to_string(),
            anthropic_api_key: None,
            anthropic_api_url: DEFAULT_ANTHROPIC_API_URL.to_string(),
            trivia_model: DEFAULT_TRIVIA_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl EnrichConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `UNSPLASH_ACCESS_KEY`: image search key; placeholders are used without it
    /// - `UNSPLASH_API_URL`: default `https://api.unsplash.com`
    /// - `ANTHROPIC_API_KEY`: required for trivia
    /// - `ANTHROPIC_API_URL`: default `https://api.anthropic.com`
    /// - `TRIVIA_MODEL`: default `claude-sonnet-4-20250514`
    /// - `ENRICH_TIMEOUT_SECS`: default 5
    /// - `ENRICH_CONCURRENCY`: default 10
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            unsplash_access_key: non_empty(UNSPLASH_KEY_VAR),
            unsplash_api_url: base_url(non_empty("UNSPLASH_API_URL"), DEFAULT_UNSPLASH_API_URL),
            anthropic_api_key: non_empty(ANTHROPIC_KEY_VAR),
            anthropic_api_url: base_url(non_empty("ANTHROPIC_API_URL"), DEFAULT_ANTHROPIC_API_URL),
            trivia_model: non_empty("TRIVIA_MODEL").unwrap_or_else(|| DEFAULT_TRIVIA_MODEL.to_string()),
            timeout: Duration::from_secs(parse_or(
                non_empty("ENRICH_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )),
            concurrency: parse_or(non_empty("ENRICH_CONCURRENCY"), DEFAULT_CONCURRENCY).max(1),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

fn base_url(value: Option<String>, default: &str) -> String {
    value
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
