use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_API_BASE;

/// Application configuration loaded from environment variables.
/// Startup fails if the API key is missing; the service never runs without it.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub port: u16,
    pub rust_log: String,
    /// Sessions untouched for this long are evicted.
    pub session_idle_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let gemini_api_key = ["GEMINI_API_KEY", "API_KEY"]
            .into_iter()
            .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()));
        let Some(gemini_api_key) = gemini_api_key else {
            bail!(
                "GEMINI_API_KEY environment variable is not set. \
                 Please set it to use the Gemini API."
            );
        };

        Ok(Config {
            gemini_api_key,
            gemini_api_base: lookup("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            session_idle_secs: lookup("SESSION_IDLE_SECS")
                .unwrap_or_else(|| "3600".to_string())
                .parse::<u64>()
                .context("SESSION_IDLE_SECS must be a whole number of seconds")?,
        })
    }
}
