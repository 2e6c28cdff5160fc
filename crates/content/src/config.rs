//! Content repository configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GITHUB_REPO` - Repository holding the record files (`owner/name`)
//! - `GITHUB_TOKEN` - Access token with contents read/write permission
//!
//! ## Optional
//! - `GITHUB_BRANCH` - Branch to read and commit to (default: main)
//! - `GITHUB_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `GITHUB_API_URL` - API root (default: <https://api.github.com>)
//!
//! The helper functions at the bottom of this module are shared by the
//! storefront and admin configuration loaders.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_BRANCH: &str = "main";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Remote content repository configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ContentConfig {
    /// API root, e.g. `https://api.github.com`
    pub api_url: Url,
    /// Repository in `owner/name` form
    pub repo: String,
    /// Branch to read from and commit to
    pub branch: String,
    /// Access token
    pub token: SecretString,
    /// Timeout applied to every request
    pub timeout: Duration,
}

impl std::fmt::Debug for ContentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentConfig")
            .field("api_url", &self.api_url.as_str())
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ContentConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let repo = get_required_env("GITHUB_REPO")?;
        validate_repo(&repo, "GITHUB_REPO")?;

        let token = get_validated_secret("GITHUB_TOKEN")?;

        let branch = get_optional_env("GITHUB_BRANCH")
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        let timeout_secs = get_env_or_default("GITHUB_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar("GITHUB_TIMEOUT_SECS".to_string(), e.to_string()))?;

        let api_url = Url::parse(&get_env_or_default("GITHUB_API_URL", DEFAULT_API_URL))
            .map_err(|e| ConfigError::InvalidEnvVar("GITHUB_API_URL".to_string(), e.to_string()))?;

        Ok(Self {
            api_url,
            repo,
            branch,
            token,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Base URL under which repository files are publicly readable.
    #[must_use]
    pub fn raw_base_url(&self) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/",
            self.repo, self.branch
        )
    }
}

fn validate_repo(repo: &str, var_name: &str) -> Result<(), ConfigError> {
    let valid = repo
        .split_once('/')
        .is_some_and(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected owner/name, got {repo:?}"),
        ))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if unset or empty.
pub fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
#[must_use]
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
#[must_use]
pub fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued by the API."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
///
/// # Errors
///
/// Returns an error if the variable is missing or fails the strength check.
pub fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
