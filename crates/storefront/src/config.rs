//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `PLATFORM_API_URL` - Course platform API (default: <http://localhost:5000>)
//! - `PLATFORM_CONNECT_TIMEOUT_SECS` - TCP connect timeout (default: 10)
//! - `CATALOGUE_CACHE_TTL_SECS` - Public course list cache lifetime (default: 300)
//! - `SESSION_MARKER_TTL_HOURS` - Lifetime of the token/username markers (default: 7, max: 168)
//! - `ROLE_MARKER_TTL_HOURS` - Lifetime of the role marker (default: 7, max: 7)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)
//!
//! When the role marker lapses before the token marker, the next request asks
//! the platform for the role again.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Upper bound for the token and username markers (7 days).
pub const MAX_SESSION_MARKER_TTL_HOURS: i64 = 7 * 24;

/// Upper bound for the role marker.
pub const MAX_ROLE_MARKER_TTL_HOURS: i64 = 7;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Course platform API configuration
    pub platform: PlatformConfig,
    /// Lifetimes of the visitor markers
    pub markers: MarkerConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Course platform API configuration.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Base URL every API path is joined onto
    pub base_url: Url,
    /// TCP connect timeout; requests themselves have no deadline
    pub connect_timeout: Duration,
    /// How long the public course catalogue is cached
    pub catalogue_ttl: Duration,
}

impl PlatformConfig {
    /// Configuration pointing at `base_url` with default timeouts.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            catalogue_ttl: Duration::from_secs(300),
        }
    }
}

/// Visitor marker lifetimes.
#[derive(Debug, Clone, Copy)]
pub struct MarkerConfig {
    /// Token and username marker lifetime, counted from login
    pub session_ttl: chrono::Duration,
    /// Role marker lifetime, counted from the last write
    pub role_ttl: chrono::Duration,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            session_ttl: chrono::Duration::hours(7),
            role_ttl: chrono::Duration::hours(MAX_ROLE_MARKER_TTL_HOURS),
        }
    }
}

impl StorefrontConfig {
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

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env.parsed_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parsed_or("STOREFRONT_PORT", 3000_u16)?;
        let base_url = env.url("STOREFRONT_BASE_URL", None)?;

        let mut platform =
            PlatformConfig::new(env.url("PLATFORM_API_URL", Some("http://localhost:5000"))?);
        platform.connect_timeout =
            Duration::from_secs(env.parsed_or("PLATFORM_CONNECT_TIMEOUT_SECS", 10_u64)?);
        platform.catalogue_ttl =
            Duration::from_secs(env.parsed_or("CATALOGUE_CACHE_TTL_SECS", 300_u64)?);

        let markers = MarkerConfig {
            session_ttl: chrono::Duration::hours(env.hours(
                "SESSION_MARKER_TTL_HOURS",
                7,
                MAX_SESSION_MARKER_TTL_HOURS,
            )?),
            role_ttl: chrono::Duration::hours(env.hours(
                "ROLE_MARKER_TTL_HOURS",
                MAX_ROLE_MARKER_TTL_HOURS,
                MAX_ROLE_MARKER_TTL_HOURS,
            )?),
        };

        Ok(Self {
            host,
            port,
            base_url,
            platform,
            markers,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parsed_or("SENTRY_SAMPLE_RATE", 1.0_f32)?,
            sentry_traces_sample_rate: env.parsed_or("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional, non-blank variable.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    fn url(&self, key: &str, default: Option<&str>) -> Result<Url, ConfigError> {
        let raw = self
            .get(key)
            .or_else(|| default.map(String::from))
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))?;
        let url = Url::parse(raw.trim())
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }

    fn hours(&self, key: &str, default: i64, max: i64) -> Result<i64, ConfigError> {
        let hours = self.parsed_or(key, default)?;
        if !(1..=max).contains(&hours) {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("must be between 1 and {max} hours (got {hours})"),
            ));
        }
        Ok(hours)
    }
}
