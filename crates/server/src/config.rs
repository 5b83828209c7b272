//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPTRAIL_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `SHOPTRAIL_HOST` - Bind address (default: 0.0.0.0)
//! - `SHOPTRAIL_PORT` - Listen port (falls back to `PORT`, default: 3000)
//! - `FRONTEND_URL` - Origin allowed by CORS, with credentials (default: <http://localhost:3000>)
//! - `SHOPTRAIL_OTP_TTL_SECS` - OTP lifetime in seconds (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (e.g. production)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Fraction of requests traced (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::http::HeaderValue;
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_OTP_TTL_SECS: u64 = 5 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Browser origin allowed to call the API with credentials
    pub frontend_origin: HeaderValue,
    /// How long an issued OTP stays valid
    pub otp_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Sentry performance sampling rate
    pub sentry_traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("SHOPTRAIL_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("SHOPTRAIL_DATABASE_URL".to_owned()))?;

        let host = parse_or_default(&lookup, "SHOPTRAIL_HOST", "0.0.0.0")?;

        let (port_key, port_value) = match lookup("SHOPTRAIL_PORT") {
            Some(value) => ("SHOPTRAIL_PORT", value),
            None => ("PORT", lookup("PORT").unwrap_or_else(|| "3000".to_owned())),
        };
        let port = port_value
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar(port_key.to_owned(), e.to_string()))?;

        let frontend_url = lookup("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_owned());
        let frontend_origin = parse_origin(&frontend_url)?;

        let otp_ttl_secs: u64 = parse_or_default(
            &lookup,
            "SHOPTRAIL_OTP_TTL_SECS",
            &DEFAULT_OTP_TTL_SECS.to_string(),
        )?;
        if otp_ttl_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPTRAIL_OTP_TTL_SECS".to_owned(),
                "must be greater than zero".to_owned(),
            ));
        }

        let sentry_traces_sample_rate =
            parse_or_default(&lookup, "SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            database_url,
            host,
            port,
            frontend_origin,
            otp_ttl: Duration::from_secs(otp_ttl_secs),
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or_default<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .unwrap_or_else(|| default.to_owned())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}

/// The frontend URL ends up verbatim in `Access-Control-Allow-Origin`.
fn parse_origin(origin: &str) -> Result<HeaderValue, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEnvVar("FRONTEND_URL".to_owned(), reason.to_owned());

    if !(origin.starts_with("http://") || origin.starts_with("https://")) {
        return Err(invalid("must start with http:// or https://"));
    }
    if origin.ends_with('/') {
        return Err(invalid("must not end with a trailing slash"));
    }
    HeaderValue::from_str(origin).map_err(|e| invalid(&e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("SHOPTRAIL_DATABASE_URL", "postgres://localhost/shoptrail")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host.to_string(), "0.0.0.0");
        assert_eq!(config.frontend_origin, "http://localhost:3000");
        assert_eq!(config.otp_ttl, Duration::from_secs(300));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "SHOPTRAIL_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fallback/db")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback/db");
    }

    #[test]
    fn test_port_precedence() {
        let config = load(&[("DATABASE_URL", "postgres://x/y"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.port, 8080);

        let config = load(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("PORT", "8080"),
            ("SHOPTRAIL_PORT", "9090"),
        ])
        .unwrap();
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("DATABASE_URL", "postgres://x/y"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "PORT"));
    }

    #[test]
    fn test_invalid_frontend_url() {
        assert!(load(&[("DATABASE_URL", "postgres://x/y"), ("FRONTEND_URL", "localhost:3000")]).is_err());
        assert!(load(&[("DATABASE_URL", "postgres://x/y"), ("FRONTEND_URL", "https://shop.example/")]).is_err());
        assert!(load(&[("DATABASE_URL", "postgres://x/y"), ("FRONTEND_URL", "https://shop.example")]).is_ok());
    }

    #[test]
    fn test_zero_otp_ttl_rejected() {
        let err = load(&[("DATABASE_URL", "postgres://x/y"), ("SHOPTRAIL_OTP_TTL_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("DATABASE_URL", "postgres://user:hunter2@db/shop")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
    }

    #[test]
    fn test_socket_addr() {
        let config = load(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("SHOPTRAIL_HOST", "127.0.0.1"),
            ("SHOPTRAIL_PORT", "3001"),
        ])
        .unwrap();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }
}
