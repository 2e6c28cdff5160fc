//! Admin credential verification.
//!
//! The admin panel has a single account whose password is configured as a
//! hex SHA-256 digest. The check sits behind [`CredentialStore`] so the login
//! route does not depend on how credentials are kept.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::config::AdminConfig;

/// Source of truth for admin logins.
pub trait CredentialStore: Send + Sync {
    /// Whether `username`/`password` identify the admin.
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Compares against one configured username and password digest.
pub struct Sha256CredentialStore {
    username: String,
    password_sha256: SecretString,
}

impl Sha256CredentialStore {
    /// Create a store from a username and a lowercase hex SHA-256 digest.
    #[must_use]
    pub const fn new(username: String, password_sha256: SecretString) -> Self {
        Self {
            username,
            password_sha256,
        }
    }

    #[must_use]
    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(
            config.admin_username.clone(),
            config.admin_password_sha256.clone(),
        )
    }
}

impl CredentialStore for Sha256CredentialStore {
    fn verify(&self, username: &str, password: &str) -> bool {
        let digest = hex::encode(Sha256::digest(password.as_bytes()));
        // Evaluate both comparisons so a wrong username costs the same.
        let user_ok = constant_time_eq(username.trim().as_bytes(), self.username.as_bytes());
        let password_ok = constant_time_eq(
            digest.as_bytes(),
            self.password_sha256.expose_secret().as_bytes(),
        );
        user_ok & password_ok
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SHA-256 of "password".
    const PASSWORD_DIGEST: &str =
        "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";

    fn store() -> Sha256CredentialStore {
        Sha256CredentialStore::new(
            "admin".to_string(),
            SecretString::from(PASSWORD_DIGEST),
        )
    }

    #[test]
    fn test_verify_accepts_matching_credentials() {
        assert!(store().verify("admin", "password"));
        assert!(store().verify(" admin ", "password"));
    }

    #[test]
    fn test_verify_rejects_wrong_password_or_user() {
        assert!(!store().verify("admin", "Password"));
        assert!(!store().verify("root", "password"));
        assert!(!store().verify("", ""));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
