//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults suit a local setup where the Bazar
//! Pepe API runs on port 8080.
//!
//! - `BAZAR_API_BASE_URL` - Base URL of the remote API (default: `http://localhost:8080`)
//! - `BAZAR_API_TIMEOUT_SECS` - Per-request timeout for API calls (default: 30)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL; `https://` enables secure cookies
//!   (default: `http://localhost:3000`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the Bazar Pepe REST API
    pub api_base_url: Url,
    /// Timeout applied to every API request
    pub api_timeout: Duration,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to a value that does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_env("BAZAR_API_BASE_URL", "http://localhost:8080")?;
        let timeout_secs: u64 = parse_env("BAZAR_API_TIMEOUT_SECS", "30")?;
        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");

        Ok(Self {
            api_base_url,
            api_timeout: Duration::from_secs(timeout_secs),
            host,
            port,
            base_url,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Configuration for a storefront on `127.0.0.1` talking to `api_base_url`.
    ///
    /// Used by tests that bind an ephemeral port themselves.
    #[must_use]
    pub fn local(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            api_timeout: Duration::from_secs(30),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "http://localhost".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("BAZAR_PEPE_TEST_UNSET_PORT", "3000").unwrap();
        assert_eq!(port, 3000);
    }

    #[test]
    fn test_parse_value_reports_variable_name() {
        let err = parse_value::<u16>("STOREFRONT_PORT", "not-a-port").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PORT"));
        assert!(err.to_string().contains("STOREFRONT_PORT"));
    }

    #[test]
    fn test_parse_value_rejects_relative_api_url() {
        assert!(parse_value::<Url>("BAZAR_API_BASE_URL", "/api").is_err());
        let url: Url = parse_value("BAZAR_API_BASE_URL", " http://api.local:8080 ").unwrap();
        assert_eq!(url.host_str(), Some("api.local"));
    }

    #[test]
    fn test_socket_addr() {
        let mut config = StorefrontConfig::local(Url::parse("http://localhost:8080").unwrap());
        config.port = 3000;

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_secure_cookies_follow_base_url_scheme() {
        let mut config = StorefrontConfig::local(Url::parse("http://localhost:8080").unwrap());
        assert!(!config.secure_cookies());

        config.base_url = "https://bazarpepe.example".to_string();
        assert!(config.secure_cookies());
    }
}
