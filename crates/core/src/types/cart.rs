//! Session shopping cart.
//!
//! A cart is a flat list of `{name, price}` pairs captured when the item was
//! added. It holds no product reference, so later renames or price changes do
//! not reach items already in the cart.

use serde::{Deserialize, Serialize};

use super::price::Price;

/// One item added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub name: String,
    pub price: Price,
}

/// Identical `(name, price)` lines collapsed for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartGroup {
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub subtotal: Price,
}

/// Session-scoped cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Append one item.
    pub fn add(&mut self, name: impl Into<String>, price: Price) {
        self.lines.push(CartLine {
            name: name.into(),
            price,
        });
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of items (not distinct groups).
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(|line| line.price).sum()
    }

    /// Lines grouped by `(name, price)` in order of first addition.
    #[must_use]
    pub fn grouped(&self) -> Vec<CartGroup> {
        let mut groups: Vec<CartGroup> = Vec::new();
        for line in &self.lines {
            match groups
                .iter_mut()
                .find(|g| g.name == line.name && g.price == line.price)
            {
                Some(group) => {
                    group.quantity = group.quantity.saturating_add(1);
                    group.subtotal = group.price.times(group.quantity);
                }
                None => groups.push(CartGroup {
                    name: line.name.clone(),
                    price: line.price,
                    quantity: 1,
                    subtotal: line.price,
                }),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cart() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
        assert!(cart.grouped().is_empty());
    }

    #[test]
    fn test_total_and_grouping() {
        let mut cart = Cart::new();
        cart.add("Aro X", Price::from_units(100));
        cart.add("Collar Y", Price::from_units(250));
        cart.add("Aro X", Price::from_units(100));

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Price::from_units(450));

        let groups = cart.grouped();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Aro X");
        assert_eq!(groups[0].quantity, 2);
        assert_eq!(groups[0].subtotal, Price::from_units(200));
        assert_eq!(groups[1].name, "Collar Y");
        assert_eq!(groups[1].quantity, 1);
    }

    #[test]
    fn test_same_name_different_price_are_separate_groups() {
        let mut cart = Cart::new();
        cart.add("Aro X", Price::from_units(100));
        cart.add("Aro X", Price::from_units(120));
        assert_eq!(cart.grouped().len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add("Aro X", Price::from_units(100));
        cart.clear();
        assert!(cart.is_empty());
    }
}
