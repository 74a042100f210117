//! Configuration management for Blip
//!
//! Loads from optional `config/default` and `config/local` files, then
//! environment variables (`BLIP__API__BASE_URL` and so on), after `.env`.

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{EnvSession, SessionProvider, StaticSession, DEFAULT_TIMEOUT_MS};
use crate::query::{QueryOptions, DEFAULT_RETRIES};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub app: AppInfoConfig,
    pub auth: AuthConfig,
    pub query: QueryConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL, e.g. `https://api.blip.watch`
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppInfoConfig {
    pub support_email: String,
    pub landing_page_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Fixed session token; takes precedence over `token_env`
    #[serde(default)]
    pub session_token: Option<String>,
    /// Environment variable re-read on every token refresh
    pub token_env: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    pub stale_time_secs: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Emit JSON log lines instead of the human format
    pub json: bool,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // API defaults
            .set_default("api.base_url", "")?
            .set_default("api.timeout_ms", DEFAULT_TIMEOUT_MS)?
            // App info
            .set_default("app.support_email", "support@blip.watch")?
            .set_default("app.landing_page_url", "")?
            // Auth
            .set_default("auth.token_env", "BLIP_SESSION_TOKEN")?
            // Query cache
            .set_default("query.stale_time_secs", 300)?
            .set_default("query.retries", DEFAULT_RETRIES)?
            .set_default("query.retry_delay_ms", 1000)?
            // Logging
            .set_default("log.json", false)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (BLIP__*)
            .add_source(Environment::with_prefix("BLIP").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    /// Presence checks only; values are not otherwise interpreted
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("api.base_url", &self.api.base_url),
            ("app.support_email", &self.app.support_email),
            ("app.landing_page_url", &self.app.landing_page_url),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                bail!("Required configuration value {} is not set", key);
            }
        }
        Ok(())
    }

    /// Generate a digest of the config (without secrets) for logging
    pub fn digest(&self) -> String {
        format!(
            "api={} timeout_ms={} token={} stale_secs={} retries={}",
            self.api.base_url,
            self.api.timeout_ms,
            if self.auth.session_token.is_some() {
                "static"
            } else {
                self.auth.token_env.as_str()
            },
            self.query.stale_time_secs,
            self.query.retries
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            stale_time: Duration::from_secs(self.query.stale_time_secs),
            retries: self.query.retries,
            retry_delay: Duration::from_millis(self.query.retry_delay_ms),
            enabled: true,
        }
    }

    /// Where refreshed tokens come from
    pub fn session(&self) -> Arc<dyn SessionProvider> {
        match &self.auth.session_token {
            Some(token) => Arc::new(StaticSession::new(Some(token.clone()))),
            None => Arc::new(EnvSession::new(self.auth.token_env.clone())),
        }
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            api: ApiConfig {
                base_url: "https://api.blip.watch".into(),
                timeout_ms: 5000,
            },
            app: AppInfoConfig {
                support_email: "support@blip.watch".into(),
                landing_page_url: "https://blip.watch".into(),
            },
            auth: AuthConfig {
                session_token: Some("secret-token".into()),
                token_env: "BLIP_SESSION_TOKEN".into(),
            },
            query: QueryConfig {
                stale_time_secs: 300,
                retries: 2,
                retry_delay_ms: 1000,
            },
            log: LogConfig { json: false },
        }
    }

    #[test]
    fn validate_requires_presence_only() {
        assert!(sample().validate().is_ok());

        let mut missing = sample();
        missing.app.landing_page_url = "  ".into();
        let err = missing.validate().unwrap_err().to_string();
        assert!(err.contains("app.landing_page_url"));
    }

    #[test]
    fn digest_hides_the_session_token() {
        let digest = sample().digest();
        assert!(digest.contains("token=static"));
        assert!(!digest.contains("secret-token"));
    }

    #[test]
    fn query_options_follow_config() {
        let opts = sample().query_options();
        assert_eq!(opts, QueryOptions::default());
        assert_eq!(sample().timeout(), Duration::from_millis(5000));
    }
}
