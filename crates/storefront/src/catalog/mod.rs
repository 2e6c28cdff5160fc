//! Storefront catalog: the available products grouped for display.
//!
//! Only products with stock are listed. The listing is grouped by category
//! line, then by subtype, both in the order they first appear in the
//! product table. Filter options are built from the available products, so
//! a line with nothing in stock is never offered.

mod cache;

pub use cache::CatalogCache;

use glint_core::{CategoryPath, Product, ProductId};
use serde::Deserialize;
use url::Url;

/// Image shown when a product has no usable image reference.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150?text=Sin+Foto";

/// Category filter from the query string (`?line=Plata&subtype=Aros`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogFilter {
    pub line: Option<String>,
    pub subtype: Option<String>,
}

impl CatalogFilter {
    /// Drop empty values so `?line=` means "all lines".
    #[must_use]
    pub fn normalized(self) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let line = clean(self.line);
        // A subtype only narrows within a line.
        let subtype = line.as_ref().and(clean(self.subtype));
        Self { line, subtype }
    }

    fn matches(&self, path: &CategoryPath) -> bool {
        let line_ok = self.line.as_ref().is_none_or(|l| *l == path.line);
        let subtype_ok = self
            .subtype
            .as_ref()
            .is_none_or(|s| path.subtype.as_ref() == Some(s));
        line_ok && subtype_ok
    }
}

/// A product as rendered in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: String,
    pub stock: u32,
    pub image_url: String,
}

impl ProductCard {
    fn new(product: &Product, image_base: &Url) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            description: product.description.clone(),
            price: product.price.display(),
            stock: product.stock,
            image_url: resolve_image(product.image_path.as_deref(), image_base),
        }
    }
}

/// Products of one subtype (or of a line without subtypes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtypeGroup {
    pub subtype: Option<String>,
    pub products: Vec<ProductCard>,
}

/// Products of one line, grouped by subtype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSection {
    pub line: String,
    pub groups: Vec<SubtypeGroup>,
}

/// Everything the home page needs to render the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub sections: Vec<LineSection>,
    /// Lines with at least one available product.
    pub lines: Vec<String>,
    /// Subtypes of the selected line with at least one available product.
    pub subtypes: Vec<String>,
    pub filter: CatalogFilter,
}

impl Listing {
    /// Build the listing from the full product table.
    #[must_use]
    pub fn build(products: &[Product], filter: CatalogFilter, image_base: &Url) -> Self {
        let filter = filter.normalized();
        let available: Vec<(&Product, CategoryPath)> = products
            .iter()
            .filter(|p| p.is_available())
            .map(|p| (p, p.category_path()))
            .collect();

        let mut lines: Vec<String> = Vec::new();
        let mut subtypes: Vec<String> = Vec::new();
        for (_, path) in &available {
            push_unique(&mut lines, &path.line);
            if filter.line.as_deref() == Some(path.line.as_str())
                && let Some(subtype) = &path.subtype
            {
                push_unique(&mut subtypes, subtype);
            }
        }

        let mut sections: Vec<LineSection> = Vec::new();
        for (product, path) in available.iter().filter(|(_, path)| filter.matches(path)) {
            if !sections.iter().any(|s| s.line == path.line) {
                sections.push(LineSection {
                    line: path.line.clone(),
                    groups: Vec::new(),
                });
            }
            let Some(section) = sections.iter_mut().find(|s| s.line == path.line) else {
                continue;
            };

            if !section.groups.iter().any(|g| g.subtype == path.subtype) {
                section.groups.push(SubtypeGroup {
                    subtype: path.subtype.clone(),
                    products: Vec::new(),
                });
            }
            if let Some(group) = section.groups.iter_mut().find(|g| g.subtype == path.subtype) {
                group.products.push(ProductCard::new(product, image_base));
            }
        }

        Self {
            sections,
            lines,
            subtypes,
            filter,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    #[must_use]
    pub fn is_selected_line(&self, line: &str) -> bool {
        self.filter.line.as_deref() == Some(line)
    }

    #[must_use]
    pub fn is_selected_subtype(&self, subtype: &str) -> bool {
        self.filter.subtype.as_deref() == Some(subtype)
    }

    /// Number of products shown.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| &s.groups)
            .map(|g| g.products.len())
            .sum()
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

/// Resolve a stored image reference to a URL the browser can load.
///
/// Absolute `http(s)` URLs pass through, repository-relative paths are joined
/// onto `base`, and anything else falls back to [`PLACEHOLDER_IMAGE`].
#[must_use]
pub fn resolve_image(image_path: Option<&str>, base: &Url) -> String {
    let Some(path) = image_path.map(str::trim).filter(|p| !p.is_empty()) else {
        return PLACEHOLDER_IMAGE.to_string();
    };

    if let Ok(url) = Url::parse(path) {
        return if matches!(url.scheme(), "http" | "https") {
            url.into()
        } else {
            PLACEHOLDER_IMAGE.to_string()
        };
    }

    base.join(path.trim_start_matches('/'))
        .map_or_else(|_| PLACEHOLDER_IMAGE.to_string(), Into::into)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use glint_core::Price;

    use super::*;

    fn base() -> Url {
        Url::parse("https://raw.githubusercontent.com/glint/tienda/main/").unwrap()
    }

    fn product(id: i32, name: &str, category: &str, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: category.to_string(),
            price: Price::from_units(100),
            stock,
            image_path: None,
            description: String::new(),
        }
    }

    fn table() -> Vec<Product> {
        vec![
            product(1, "Aro X", "Plata - Aros", 5),
            product(2, "Collar Y", "Acero Dorado - Collares", 2),
            product(3, "Aro Z", "Acero Dorado - Aros", 0),
            product(4, "Pañuelo", "Pañuelos", 1),
            product(5, "Aro W", "Acero Dorado - Aros", 3),
            product(6, "Anillo", "Acero Dorado - Collares", 1),
        ]
    }

    fn names(listing: &Listing) -> Vec<String> {
        listing
            .sections
            .iter()
            .flat_map(|s| &s.groups)
            .flat_map(|g| &g.products)
            .map(|p| p.name.clone())
            .collect()
    }

    #[test]
    fn test_out_of_stock_never_listed() {
        let listing = Listing::build(&table(), CatalogFilter::default(), &base());
        assert!(!names(&listing).contains(&"Aro Z".to_string()));
        assert_eq!(listing.product_count(), 5);
    }

    #[test]
    fn test_grouping_preserves_first_appearance() {
        let listing = Listing::build(&table(), CatalogFilter::default(), &base());
        let lines: Vec<_> = listing.sections.iter().map(|s| s.line.as_str()).collect();
        assert_eq!(lines, ["Plata", "Acero Dorado", "Pañuelos"]);

        let dorado = &listing.sections[1];
        let subtypes: Vec<_> = dorado.groups.iter().map(|g| g.subtype.as_deref()).collect();
        assert_eq!(subtypes, [Some("Collares"), Some("Aros")]);
        assert_eq!(dorado.groups[0].products.len(), 2);

        assert_eq!(listing.sections[2].groups[0].subtype, None);
    }

    #[test]
    fn test_filter_by_line_and_subtype() {
        let filter = CatalogFilter {
            line: Some("Acero Dorado".to_string()),
            subtype: Some("Aros".to_string()),
        };
        let listing = Listing::build(&table(), filter, &base());
        assert_eq!(names(&listing), ["Aro W"]);
        assert_eq!(listing.subtypes, ["Collares", "Aros"]);
        assert_eq!(listing.lines, ["Plata", "Acero Dorado", "Pañuelos"]);
    }

    #[test]
    fn test_filter_options_skip_sold_out_lines() {
        let products = vec![
            product(1, "Aro X", "Plata - Aros", 0),
            product(2, "Pañuelo", "Pañuelos", 1),
        ];
        let listing = Listing::build(&products, CatalogFilter::default(), &base());
        assert_eq!(listing.lines, ["Pañuelos"]);
    }

    #[test]
    fn test_empty_filter_values_mean_all() {
        let filter = CatalogFilter {
            line: Some("  ".to_string()),
            subtype: Some("Aros".to_string()),
        };
        assert_eq!(filter.normalized(), CatalogFilter::default());
    }

    #[test]
    fn test_resolve_image() {
        assert_eq!(resolve_image(None, &base()), PLACEHOLDER_IMAGE);
        assert_eq!(resolve_image(Some("  "), &base()), PLACEHOLDER_IMAGE);
        assert_eq!(
            resolve_image(Some("img/aro-x.jpg"), &base()),
            "https://raw.githubusercontent.com/glint/tienda/main/img/aro-x.jpg"
        );
        assert_eq!(
            resolve_image(Some("https://cdn.example.com/a.png"), &base()),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(
            resolve_image(Some("javascript:alert(1)"), &base()),
            PLACEHOLDER_IMAGE
        );
    }
}
