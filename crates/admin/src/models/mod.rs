//! Session models for admin.

pub mod session;

pub use session::{CurrentAdmin, Flash, FlashLevel, MAX_LOGIN_ATTEMPTS, keys as session_keys};
