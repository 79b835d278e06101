//! Gateway configuration from the process environment.
//!
//! The secret token stays backend-only: the frontend is a stateless client
//! and never receives or sends it. `.env` loading (dotenvy) happens in the
//! gateway binary before this is read.

use chrono::Duration;

use crate::bridge::DEFAULT_ENDPOINT;
use crate::prompt::DEFAULT_MODEL;
use crate::quota::{DEFAULT_MAX_CLIENTS, DEFAULT_MAX_STRIKES, DEFAULT_WINDOW_SECS};

/// Environment-sourced settings for one gateway process.
#[derive(Debug, Clone)]
pub struct ForgeConfig {
    /// Upstream secret (`BUSHIGO_TOKEN`). `None` short-circuits every request
    /// to the fixed no-token result without contacting upstream.
    pub token: Option<String>,
    /// Chat-completions endpoint URL.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Listen port (`PORT`, default 8000).
    pub port: u16,
    /// Sliding-window length for the strike ledger.
    pub window: Duration,
    /// Settled strikes per client per window.
    pub max_strikes: usize,
    /// Cap on distinct client records held in memory.
    pub max_clients: usize,
}

impl ForgeConfig {
    pub fn from_env() -> Self {
        let token = std::env::var("BUSHIGO_TOKEN")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let endpoint = env_or("FORGE_ENDPOINT", DEFAULT_ENDPOINT);
        let model = env_or("FORGE_MODEL", DEFAULT_MODEL);
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(8000);
        let window_secs = std::env::var("FORGE_WINDOW_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_WINDOW_SECS);
        let max_strikes = std::env::var("FORGE_MAX_STRIKES")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_STRIKES);
        let max_clients = std::env::var("FORGE_MAX_CLIENTS")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_CLIENTS);

        Self {
            token,
            endpoint,
            model,
            port,
            window: Duration::seconds(window_secs),
            max_strikes,
            max_clients,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}
