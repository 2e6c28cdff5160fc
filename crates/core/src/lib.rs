//! Glint Core - Shared domain types and record codecs.
//!
//! This crate provides the types used by every Glint component:
//! - `storefront` - Public catalog and cart
//! - `admin` - Inventory and category administration
//! - `content` - Remote record files and the record store
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no network access,
//! no sessions, no HTTP. Encoding and decoding of the record files lives here
//! because both sides of the system need it and it is side-effect free.
//!
//! # Modules
//!
//! - [`types`] - Products, prices, the category tree and the session cart
//! - [`codec`] - CSV product table and JSON category tree codecs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod codec;
pub mod types;

pub use codec::CodecError;
pub use types::*;
