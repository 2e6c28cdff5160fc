//! Session-related types.
//!
//! The cart is the only state the storefront keeps per visitor. It holds
//! `{name, price}` lines copied at the time of adding, so later edits to the
//! product table do not change carts already in progress.

use glint_core::Cart;
use tower_sessions::Session;

/// Session keys for storefront data.
pub mod keys {
    /// Key for the visitor's cart.
    pub const CART: &str = "cart";
}

/// Read the cart from the session, empty if none was stored yet.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// Store the cart in the session.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}
