//! Runtime configuration

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Client configuration, resolved from defaults, `.env`, the environment and
/// finally command-line overrides.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST API, including the `/api` prefix
    pub api_url: String,
    /// Where the cached token and user live between runs
    pub session_dir: PathBuf,
    pub request_timeout: Duration,
    pub log_level: String,
}

impl Config {
    /// Read `ESTATE_TIMEOUT_SECS` and `ESTATE_LOG_LEVEL` on top of the
    /// defaults. The API URL and session directory come from the command line
    /// (or their `ESTATE_*` variables) and are applied by the caller.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(secs) = var("ESTATE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("ESTATE_TIMEOUT_SECS is not a number: {secs}"))?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(level) = var("ESTATE_LOG_LEVEL") {
            config.log_level = level;
        }
        Ok(config)
    }

    /// Origin static files are served from: the API URL without `/api`.
    pub fn asset_origin(&self) -> String {
        self.api_url.replacen("/api", "", 1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_dir: default_session_dir(),
            request_timeout: Duration::from_secs(30),
            log_level: "info".to_string(),
        }
    }
}

/// Load `.env` into the process environment; a missing file is fine. Runs
/// before argument parsing so clap's `env` fallbacks see it too.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

pub fn default_session_dir() -> PathBuf {
    dirs_next::data_dir()
        .map(|dir| dir.join("estate-portal"))
        .unwrap_or_else(|| PathBuf::from(".estate-portal"))
}
