//! Product records as stored in the shop's product table.

use serde::{Deserialize, Serialize};

use super::category::CategoryPath;
use super::id::ProductId;
use super::price::Price;

/// A product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier, assigned as `max(existing) + 1`.
    pub id: ProductId,
    pub name: String,
    /// Either `"<line> - <subtype>"` or a bare line.
    pub category: String,
    pub price: Price,
    pub stock: u32,
    /// Repository-relative path (`img/aro.jpg`) or absolute URL.
    pub image_path: Option<String>,
    pub description: String,
}

impl Product {
    /// Whether the product is listed on the storefront.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.stock > 0
    }

    /// Split the category into line and optional subtype.
    #[must_use]
    pub fn category_path(&self) -> CategoryPath {
        CategoryPath::parse(&self.category)
    }
}

/// A product that has not been assigned an ID yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: Price,
    pub stock: u32,
    pub image_path: Option<String>,
    pub description: String,
}

impl NewProduct {
    /// Attach an ID, producing a full product record.
    #[must_use]
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
            stock: self.stock,
            image_path: self.image_path,
            description: self.description,
        }
    }
}

/// The ID the next created product receives.
///
/// IDs are never gap-filled: the result is one past the largest existing ID,
/// or 1 for an empty table. `None` once the largest ID is `i32::MAX`.
#[must_use]
pub fn next_product_id(products: &[Product]) -> Option<ProductId> {
    products
        .iter()
        .map(|p| p.id)
        .max()
        .map_or(Some(ProductId::new(1)), |max| max.checked_next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i32, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Producto {id}"),
            category: "Plata - Aros".to_string(),
            price: Price::from_units(100),
            stock,
            image_path: None,
            description: String::new(),
        }
    }

    #[test]
    fn test_next_id_is_max_plus_one() {
        let products = vec![product(1, 1), product(3, 1), product(4, 1)];
        assert_eq!(next_product_id(&products), Some(ProductId::new(5)));
    }

    #[test]
    fn test_next_id_ignores_order() {
        let products = vec![product(7, 1), product(2, 1)];
        assert_eq!(next_product_id(&products), Some(ProductId::new(8)));
    }

    #[test]
    fn test_next_id_empty_table() {
        assert_eq!(next_product_id(&[]), Some(ProductId::new(1)));
    }

    #[test]
    fn test_next_id_exhausted() {
        let products = vec![product(i32::MAX, 1), product(2, 1)];
        assert_eq!(next_product_id(&products), None);
    }

    #[test]
    fn test_availability() {
        assert!(product(1, 3).is_available());
        assert!(!product(1, 0).is_available());
    }
}
