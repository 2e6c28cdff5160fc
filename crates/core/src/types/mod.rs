//! Core types for Glint.
//!
//! This module provides type-safe wrappers for the shop's domain concepts.

pub mod cart;
pub mod category;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{Cart, CartGroup, CartLine};
pub use category::{
    CATEGORY_SEPARATOR, CategoryError, CategoryLine, CategoryPath, CategoryTree,
};
pub use id::*;
pub use price::Price;
pub use product::{NewProduct, Product, next_product_id};
