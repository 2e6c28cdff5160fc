//! Business logic services for admin.
//!
//! # Services
//!
//! - `credentials` - Admin login verification
//! - `images` - Product image uploads
//! - `inventory` - Product and category editing against the content repository

pub mod credentials;
pub mod images;
pub mod inventory;

pub use credentials::{CredentialStore, Sha256CredentialStore};
pub use images::{ImageError, ImageUpload};
pub use inventory::{BulkOutcome, Inventory, InventoryError, ProductDraft, ProductEdit};
