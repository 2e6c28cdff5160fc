//! Short-lived cache of the product table.

use std::sync::Arc;
use std::time::Duration;

use glint_content::{Products, Repository};
use glint_core::Product;
use moka::future::Cache;
use tracing::{debug, warn};

/// How long a loaded product table is served before it is fetched again.
pub const CATALOG_TTL: Duration = Duration::from_secs(30);

/// Cache key. The storefront only ever caches one table.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct ProductTable;

/// Caches the product table to bound calls to the content API.
///
/// Load failures are not cached: the storefront shows an empty listing and
/// the next request tries again.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<ProductTable, Arc<Vec<Product>>>,
}

impl CatalogCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(16).time_to_live(ttl).build(),
        }
    }

    /// The product table, from cache or freshly loaded.
    pub async fn products(&self, repository: &Repository) -> Arc<Vec<Product>> {
        if let Some(products) = self.cache.get(&ProductTable).await {
            debug!("Catalog cache hit");
            return products;
        }

        let mut store = repository.store::<Products>();
        match store.load().await {
            Ok(()) => {
                let products = Arc::new(store.data().clone());
                self.cache.insert(ProductTable, products.clone()).await;
                debug!(count = products.len(), "Catalog loaded");
                products
            }
            Err(e) => {
                warn!(error = %e, "Failed to load products, showing an empty catalog");
                Arc::new(Vec::new())
            }
        }
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new(CATALOG_TTL)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use glint_content::{ContentError, MemoryContentClient};
    use glint_core::codec::encode_products;
    use glint_core::{Price, ProductId};

    use super::*;
    use glint_content::Collection;

    fn table() -> Vec<u8> {
        encode_products(&[Product {
            id: ProductId::new(1),
            name: "Aro X".to_string(),
            category: "Plata - Aros".to_string(),
            price: Price::from_units(100),
            stock: 5,
            image_path: None,
            description: String::new(),
        }])
        .unwrap()
    }

    #[tokio::test]
    async fn test_serves_cached_table_until_it_expires() {
        let client = MemoryContentClient::new().with_file(Products::PATH, table());
        let repository = Repository::new(Arc::new(client.clone()));
        let cache = CatalogCache::new(Duration::from_millis(100));

        assert_eq!(cache.products(&repository).await.len(), 1);

        client.seed(Products::PATH, encode_products(&[]).unwrap());
        assert_eq!(cache.products(&repository).await.len(), 1);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(cache.products(&repository).await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_degrades_to_empty_and_is_not_cached() {
        let client = MemoryContentClient::new().with_file(Products::PATH, table());
        let repository = Repository::new(Arc::new(client.clone()));
        let cache = CatalogCache::default();

        client.fail_next(ContentError::Transient("timed out".to_string()));
        assert!(cache.products(&repository).await.is_empty());
        assert_eq!(cache.products(&repository).await.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let repository = Repository::new(Arc::new(MemoryContentClient::new()));
        assert!(CatalogCache::default().products(&repository).await.is_empty());
    }
}
