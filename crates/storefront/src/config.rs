//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>).
//!   An `https` URL marks the session cookie `Secure`.
//! - `STOREFRONT_STATIC_DIR` - Stylesheet directory served at `/static`
//!   (default: crates/storefront/static)
//! - `CATALOG_API_URL` - Product list endpoint (default: <https://fakestoreapi.com/products>)
//! - `CATALOG_TIMEOUT_SECS` - Per-request timeout for catalog calls (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default product list endpoint.
pub const DEFAULT_CATALOG_API_URL: &str = "https://fakestoreapi.com/products";

/// Default static asset directory, relative to the workspace root.
pub const DEFAULT_STATIC_DIR: &str = "crates/storefront/static";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
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
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Remote catalog API configuration
    pub catalog: CatalogConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g., "production")
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Remote catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// List endpoint; single products live at `{api_url}/{id}`.
    pub api_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl CatalogConfig {
    /// Catalog config pointing at an arbitrary endpoint with the default timeout.
    #[must_use]
    pub const fn with_api_url(api_url: Url) -> Self {
        Self {
            api_url,
            timeout: Duration::from_secs(10),
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
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let host = vars.parse_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = vars.parse_or("STOREFRONT_PORT", 3000u16)?;
        let base_url = vars.url_or("STOREFRONT_BASE_URL", "http://localhost:3000")?;
        let static_dir =
            vars.parse_or("STOREFRONT_STATIC_DIR", PathBuf::from(DEFAULT_STATIC_DIR))?;

        let api_url = vars.url_or("CATALOG_API_URL", DEFAULT_CATALOG_API_URL)?;
        let timeout_secs = vars.parse_or("CATALOG_TIMEOUT_SECS", 10u64)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let sentry_sample_rate = vars.rate_or("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = vars.rate_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?;

        Ok(Self {
            host,
            port,
            base_url,
            static_dir,
            catalog: CatalogConfig {
                api_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            sentry_dsn: vars.optional("SENTRY_DSN"),
            sentry_environment: vars.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Parse a variable, falling back to a default when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Parse a URL variable, falling back to a default when unset.
    fn url_or(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        let raw = self.optional(key).unwrap_or_else(|| default.to_string());
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

    /// Parse a sample rate in `0.0..=1.0`.
    fn rate_or(&self, key: &str, default: f32) -> Result<f32, ConfigError> {
        let rate = self.parse_or(key, default)?;
        if (0.0..=1.0).contains(&rate) {
            Ok(rate)
        } else {
            Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("{rate} is outside 0.0-1.0"),
            ))
        }
    }
}
