//! Encoding and decoding of the shop's record files.
//!
//! - [`products`] - the product table, a CSV file with a header row
//! - [`categories`] - the category tree, a pretty-printed JSON object

pub mod categories;
pub mod products;

pub use categories::{decode_categories, encode_categories};
pub use products::{PRODUCT_COLUMNS, decode_products, encode_products};

use thiserror::Error;

/// Errors from reading or writing a record file.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The CSV data could not be read or written at all.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The JSON data could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Flushing the encoded output failed.
    #[error("failed to flush encoded output: {0}")]
    Flush(String),
}
