//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `STOREFRONT_IMAGE_BASE_URL` - Base URL for relative product image paths
//!   (default: the repository's raw-content URL)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! The content repository itself is configured through
//! [`ContentConfig`](glint_content::ContentConfig).

use std::net::{IpAddr, SocketAddr};

use glint_content::ContentConfig;
use glint_content::config::{get_env_or_default, get_optional_env};
use url::Url;

pub use glint_content::ConfigError;

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Base URL that relative image paths are resolved against
    pub image_base_url: Url,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// `content` supplies the default image base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env(content: &ContentConfig) -> Result<Self, ConfigError> {
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let image_base_url = parse_base_url(
            "STOREFRONT_IMAGE_BASE_URL",
            &get_optional_env("STOREFRONT_IMAGE_BASE_URL")
                .unwrap_or_else(|| content.raw_base_url()),
        )?;

        Ok(Self {
            host,
            port,
            base_url,
            image_base_url,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Parse a base URL, ensuring a trailing slash so that joins append.
fn parse_base_url(var_name: &str, raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("X", "https://cdn.example.com/tienda").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/tienda/");
        assert_eq!(
            url.join("img/aro.jpg").unwrap().as_str(),
            "https://cdn.example.com/tienda/img/aro.jpg"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_relative() {
        assert!(matches!(
            parse_base_url("X", "img/"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_is_secure() {
        let mut config = StorefrontConfig {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            image_base_url: Url::parse("https://raw.githubusercontent.com/glint/tienda/main/")
                .unwrap(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        assert!(!config.is_secure());
        config.base_url = "https://glint.example".to_string();
        assert!(config.is_secure());
    }
}
