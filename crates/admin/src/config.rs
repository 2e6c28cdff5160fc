//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_USERNAME` - Login name of the shop administrator
//! - `ADMIN_PASSWORD_SHA256` - Hex SHA-256 digest of the admin password
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL for the admin panel (default: <http://localhost:3001>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! The content repository itself is configured through
//! [`ContentConfig`](glint_content::ContentConfig).

use std::net::{IpAddr, SocketAddr};

use glint_content::config::{get_env_or_default, get_optional_env, get_required_env};
use secrecy::SecretString;

pub use glint_content::ConfigError;

/// Length of a hex-encoded SHA-256 digest.
const SHA256_HEX_LEN: usize = 64;

/// Admin application configuration.
#[derive(Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Login name accepted by the credential check
    pub admin_username: String,
    /// Lowercase hex SHA-256 of the admin password
    pub admin_password_sha256: SecretString,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("admin_username", &self.admin_username)
            .field("admin_password_sha256", &"[REDACTED]")
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;

        let admin_username = get_required_env("ADMIN_USERNAME")?.trim().to_string();
        let admin_password_sha256 = parse_password_digest(
            "ADMIN_PASSWORD_SHA256",
            &get_required_env("ADMIN_PASSWORD_SHA256")?,
        )?;

        Ok(Self {
            host,
            port,
            base_url: get_env_or_default("ADMIN_BASE_URL", "http://localhost:3001"),
            admin_username,
            admin_password_sha256,
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

/// Validate a hex SHA-256 digest and normalise it to lowercase.
fn parse_password_digest(var_name: &str, raw: &str) -> Result<SecretString, ConfigError> {
    let digest = raw.trim().to_ascii_lowercase();
    if digest.len() != SHA256_HEX_LEN || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected {SHA256_HEX_LEN} hex characters"),
        ));
    }
    Ok(SecretString::from(digest))
}
