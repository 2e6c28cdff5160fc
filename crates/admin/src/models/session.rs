//! Session-related types for admin.
//!
//! The admin session holds the login flag, the failed login counter, the
//! product and category snapshots the admin is editing against, and a
//! one-shot flash message shown after a redirect.

use chrono::{DateTime, Utc};
use glint_content::Snapshot;
use glint_core::{CategoryTree, Product};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::services::Inventory;

/// Failed logins allowed per session before the form is locked.
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// Session-stored admin identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub username: String,
    pub logged_in_at: DateTime<Utc>,
}

/// Session keys for admin data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the failed login counter.
    pub const LOGIN_ATTEMPTS: &str = "login_attempts";

    /// Key for the product table snapshot.
    pub const PRODUCTS: &str = "products_snapshot";

    /// Key for the category tree snapshot.
    pub const CATEGORIES: &str = "categories_snapshot";

    /// Key for the pending flash message.
    pub const FLASH: &str = "flash";
}

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl FlashLevel {
    /// CSS class of the banner.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "flash flash-success",
            Self::Info => "flash flash-info",
            Self::Warning => "flash flash-warning",
            Self::Error => "flash flash-error",
        }
    }
}

/// A message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Error, message)
    }

    fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        self.level.css_class()
    }
}

/// Queue a flash message for the next page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(session: &Session, flash: Flash) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::FLASH, flash).await
}

/// Take the pending flash message, if any.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn take_flash(session: &Session) -> Result<Option<Flash>, tower_sessions::session::Error> {
    session.remove::<Flash>(keys::FLASH).await
}

/// Failed logins so far in this session.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn login_attempts(session: &Session) -> Result<u32, tower_sessions::session::Error> {
    Ok(session.get::<u32>(keys::LOGIN_ATTEMPTS).await?.unwrap_or(0))
}

/// Count a failed login and return the new total.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn record_failed_login(session: &Session) -> Result<u32, tower_sessions::session::Error> {
    let attempts = login_attempts(session).await?.saturating_add(1);
    session.insert(keys::LOGIN_ATTEMPTS, attempts).await?;
    Ok(attempts)
}

/// Clear the failed login counter.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn reset_login_attempts(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<u32>(keys::LOGIN_ATTEMPTS).await?;
    Ok(())
}

/// Snapshots stored by the last request, if any.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn load_snapshots(
    session: &Session,
) -> Result<(Option<Snapshot<Vec<Product>>>, Option<Snapshot<CategoryTree>>), tower_sessions::session::Error>
{
    let products = session.get(keys::PRODUCTS).await?;
    let categories = session.get(keys::CATEGORIES).await?;
    Ok((products, categories))
}

/// Store the inventory's committed state for the next request.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_snapshots(
    session: &Session,
    inventory: &Inventory,
) -> Result<(), tower_sessions::session::Error> {
    if let Some(products) = inventory.product_snapshot() {
        session.insert(keys::PRODUCTS, products).await?;
    }
    if let Some(categories) = inventory.category_snapshot() {
        session.insert(keys::CATEGORIES, categories).await?;
    }
    Ok(())
}

/// Drop the stored snapshots so the next request loads fresh data.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_snapshots(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<Snapshot<Vec<Product>>>(keys::PRODUCTS)
        .await?;
    session
        .remove::<Snapshot<CategoryTree>>(keys::CATEGORIES)
        .await?;
    Ok(())
}
