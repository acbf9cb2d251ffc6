use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub api_host: Option<String>,
    pub api_port: Option<u16>,
    pub cors_origins: Vec<String>, // empty means any origin

    // Upstream services
    pub citadel_url: String,
    pub conductor_url: String,
    pub payments_url: String,
    pub upstream_timeout_secs: u64,

    pub directory_fixture_path: Option<PathBuf>, // None loads the built-in demo directory
    pub copy_trades_path: Option<PathBuf>,       // None keeps copy trades in memory only
    pub simulated_latency_ms: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty() && origin != "*")
            .collect();

        Ok(Self {
            api_host: env::var("API_HOST").ok(),
            api_port: env::var("API_PORT")
                .ok()
                .map(|p| p.parse())
                .transpose()
                .context("Failed to parse API_PORT")?,
            cors_origins,

            citadel_url: base_url("CITADEL_URL", "http://localhost:8004"),
            conductor_url: base_url("CONDUCTOR_URL", "http://localhost:8001"),
            payments_url: base_url("PAYMENTS_URL", "http://localhost:8005"),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Failed to parse UPSTREAM_TIMEOUT_SECS")?,

            directory_fixture_path: env::var("DIRECTORY_FIXTURE_PATH").ok().map(PathBuf::from),
            copy_trades_path: env::var("COPY_TRADES_PATH").ok().map(PathBuf::from),
            simulated_latency_ms: env::var("SIMULATED_LATENCY_MS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .context("Failed to parse SIMULATED_LATENCY_MS")?,
        })
    }
}

fn base_url(var: &str, default: &str) -> String {
    env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
impl Config {
    /// Configuration pointing every upstream at the same base URL, no disk, no latency.
    pub fn for_tests(upstream_url: &str) -> Self {
        Self {
            api_host: None,
            api_port: None,
            cors_origins: Vec::new(),
            citadel_url: upstream_url.to_string(),
            conductor_url: upstream_url.to_string(),
            payments_url: upstream_url.to_string(),
            upstream_timeout_secs: 2,
            directory_fixture_path: None,
            copy_trades_path: None,
            simulated_latency_ms: 0,
        }
    }
}
