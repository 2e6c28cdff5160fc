//! The record collections kept in the content repository.

use glint_core::codec::{decode_categories, decode_products, encode_categories, encode_products};
use glint_core::{CategoryTree, CodecError, Product};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Directory holding uploaded product images.
pub const IMAGE_DIR: &str = "img";

/// A record file: where it lives and how its bytes map to data.
pub trait Collection: Send + Sync + 'static {
    type Data: Clone + Default + PartialEq + Send + Sync + Serialize + DeserializeOwned;

    /// Human-readable name used in logs and errors.
    const NAME: &'static str;

    /// Repository path of the file.
    const PATH: &'static str;

    /// Data to start from when the file does not exist yet.
    fn missing() -> Self::Data {
        Self::Data::default()
    }

    /// Decode file bytes.
    ///
    /// # Errors
    ///
    /// Returns a `CodecError` if the bytes cannot be decoded.
    fn decode(bytes: &[u8]) -> Result<Self::Data, CodecError>;

    /// Encode data to file bytes.
    ///
    /// # Errors
    ///
    /// Returns a `CodecError` if encoding fails.
    fn encode(data: &Self::Data) -> Result<Vec<u8>, CodecError>;
}

/// The product table.
pub struct Products;

impl Collection for Products {
    type Data = Vec<Product>;

    const NAME: &'static str = "products";
    const PATH: &'static str = "files_csv/products.csv";

    fn decode(bytes: &[u8]) -> Result<Self::Data, CodecError> {
        decode_products(bytes)
    }

    fn encode(data: &Self::Data) -> Result<Vec<u8>, CodecError> {
        encode_products(data)
    }
}

/// The category tree.
pub struct Categories;

impl Collection for Categories {
    type Data = CategoryTree;

    const NAME: &'static str = "categories";
    const PATH: &'static str = "files_csv/categories.json";

    fn missing() -> Self::Data {
        CategoryTree::shop_defaults()
    }

    fn decode(bytes: &[u8]) -> Result<Self::Data, CodecError> {
        decode_categories(bytes)
    }

    fn encode(data: &Self::Data) -> Result<Vec<u8>, CodecError> {
        encode_categories(data)
    }
}

/// Repository path for an image file name.
#[must_use]
pub fn image_path(file_name: &str) -> String {
    format!("{IMAGE_DIR}/{file_name}")
}
