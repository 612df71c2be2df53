//! Client configuration loaded from environment variables.
//!
//! The backend's CSRF setup varies between deployments, so the ordered list
//! of CSRF acquisition strategies is configurable alongside the API location.

use crate::auth::csrf::CsrfStrategy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (login, OAuth and CSRF endpoints live here)
    pub api_url: String,
    /// Path prefix of the JSON API beneath `api_url`
    pub api_prefix: String,
    /// File backing the persisted credential store
    pub credential_path: PathBuf,
    /// CSRF acquisition strategies, tried in order. Empty disables CSRF.
    ///
    /// Backends with CSRF protection turned off never hand out a token, so
    /// every mutation fails until this is set to `none`
    /// (`GYM_CSRF_STRATEGIES=none`).
    pub csrf_strategies: Vec<CsrfStrategy>,
    /// Name of the cookie the backend stores the CSRF token in
    pub csrf_cookie: String,
    /// Path hit by the probe strategy to provoke a fresh CSRF cookie
    pub csrf_probe_path: String,
    /// Delay after the probe request before the cookie is read
    pub csrf_settle_delay: Duration,
}

impl Default for Config {
    /// Default config for local development and tests.
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            api_prefix: "api".to_string(),
            credential_path: PathBuf::from(".gym-client/storage.json"),
            csrf_strategies: CsrfStrategy::default_order(),
            csrf_cookie: "XSRF-TOKEN".to_string(),
            csrf_probe_path: "csrf".to_string(),
            csrf_settle_delay: Duration::from_millis(100),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        let csrf_strategies = match env::var("GYM_CSRF_STRATEGIES") {
            Ok(list) => parse_strategies(&list)?,
            Err(_) => defaults.csrf_strategies,
        };

        let csrf_settle_delay = match env::var("GYM_CSRF_SETTLE_MS") {
            Ok(ms) => Duration::from_millis(
                ms.trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("GYM_CSRF_SETTLE_MS", ms.clone()))?,
            ),
            Err(_) => defaults.csrf_settle_delay,
        };

        Ok(Self {
            api_url: env::var("GYM_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            api_prefix: env::var("GYM_API_PREFIX")
                .map(|v| v.trim().trim_matches('/').to_string())
                .unwrap_or(defaults.api_prefix),
            credential_path: env::var("GYM_CREDENTIAL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.credential_path),
            csrf_strategies,
            csrf_cookie: env::var("GYM_CSRF_COOKIE").unwrap_or(defaults.csrf_cookie),
            csrf_probe_path: env::var("GYM_CSRF_PROBE_PATH")
                .map(|v| v.trim().trim_start_matches('/').to_string())
                .unwrap_or(defaults.csrf_probe_path),
            csrf_settle_delay,
        })
    }
}

/// Parse a comma-separated strategy list. `none` (or an empty list) disables CSRF.
fn parse_strategies(list: &str) -> Result<Vec<CsrfStrategy>, ConfigError> {
    let mut strategies = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if name.eq_ignore_ascii_case("none") {
            return Ok(Vec::new());
        }
        let strategy = name
            .parse()
            .map_err(|_| ConfigError::Invalid("GYM_CSRF_STRATEGIES", name.to_string()))?;
        if !strategies.contains(&strategy) {
            strategies.push(strategy);
        }
    }
    Ok(strategies)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
