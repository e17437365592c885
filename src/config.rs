//! Client configuration loaded from environment variables.
//!
//! The backend base URL is the only trust boundary that matters here:
//! credentials are attached exclusively to requests under `api_base`.

use reqwest::Url;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "http://localhost:8080";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, without trailing slash
    pub api_base: Url,
    /// Login entry point the 401 redirect navigates to
    pub login_path: String,
    /// Where the session is persisted between runs
    pub session_file: PathBuf,
    /// Per-request timeout
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; unset values fall back to a local
    /// development backend.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base = env::var("REALTY_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        Ok(Self {
            api_base: parse_api_base(&api_base)?,
            login_path: env::var("REALTY_LOGIN_PATH")
                .unwrap_or_else(|_| DEFAULT_LOGIN_PATH.to_string()),
            session_file: env::var("REALTY_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_session_file()),
            http_timeout: Duration::from_secs(
                env::var("REALTY_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    }

    /// Fixed configuration for tests, pointing at `api_base`.
    pub fn for_base(api_base: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base: parse_api_base(api_base)?,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            session_file: env::temp_dir().join("realty-test-session.json"),
            http_timeout: Duration::from_secs(5),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default base URL is valid"),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            session_file: env::temp_dir().join("realty-test-session.json"),
            http_timeout: Duration::from_secs(5),
        }
    }

    /// The base as a string without trailing slash.
    pub fn base_str(&self) -> &str {
        self.api_base.as_str().trim_end_matches('/')
    }
}

/// Parse and normalize the backend base URL.
fn parse_api_base(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ConfigError::Invalid {
        var: "REALTY_API_BASE",
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            var: "REALTY_API_BASE",
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(env::temp_dir)
        .join("realty")
        .join("session.json")
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}
