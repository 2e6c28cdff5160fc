//! Inventory and category editing.
//!
//! [`Inventory`] is the per-request editing context: a record store for the
//! product table and one for the category tree, resumed from the snapshots
//! kept in the admin's session. Every operation validates, edits the working
//! copy, and saves with a descriptive commit message. A failed save leaves
//! the committed data untouched.

use glint_content::{Categories, ContentClient, Products, RecordStore, Repository, Snapshot, StoreError};
use glint_core::{CategoryError, CategoryTree, NewProduct, Price, Product, ProductId, next_product_id};
use thiserror::Error;
use tracing::{info, instrument};

use super::images::{ImageError, ImageUpload, upload_image};

/// Commit message for a bulk edit.
pub const BULK_EDIT_MESSAGE: &str = "Actualización masiva de inventario";

/// Commit message for a category change.
pub const CATEGORY_MESSAGE: &str = "Nueva categoría añadida";

/// Errors from inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("product name is required")]
    NameRequired,

    #[error("price must be greater than zero")]
    PriceRequired,

    #[error("category error: {0}")]
    Category(#[from] CategoryError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error("edited table does not match the loaded product table")]
    TableMismatch,

    #[error("no product ids left")]
    IdsExhausted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl InventoryError {
    /// Whether the failure is on our side (remote API, codec) rather than in
    /// the submitted data.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Store(e) => !e.is_conflict(),
            Self::Image(ImageError::Upload(_)) => true,
            _ => false,
        }
    }

    /// Whether the error is a duplicate the admin can simply ignore.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Self::Category(CategoryError::LineExists(_) | CategoryError::SubtypeExists { .. })
        )
    }

    /// Message shown in the admin banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NameRequired => "El nombre del producto es obligatorio.".to_string(),
            Self::PriceRequired => "El precio debe ser mayor que cero.".to_string(),
            Self::Category(CategoryError::LineExists(_)) => "Esa categoría ya existe.".to_string(),
            Self::Category(CategoryError::SubtypeExists { .. }) => {
                "Ese tipo ya existe en esta categoría.".to_string()
            }
            Self::Category(CategoryError::EmptyName) => {
                "El nombre de la categoría es obligatorio.".to_string()
            }
            Self::Category(CategoryError::SubtypeRequired(line)) => {
                format!("Selecciona un tipo de producto para {line}.")
            }
            Self::Category(e) => format!("Categoría inválida: {e}."),
            Self::Image(ImageError::AlreadyExists(name)) => {
                format!("Ya existe una imagen llamada {name}. Renombra el archivo e intenta de nuevo.")
            }
            Self::Image(ImageError::UnsupportedType(_)) => {
                "Formato de imagen no permitido. Usa jpg, jpeg o png.".to_string()
            }
            Self::Image(_) => {
                "Error al subir la imagen. El producto no se guardó, intenta de nuevo.".to_string()
            }
            Self::NotFound(id) => {
                format!("El producto {id} ya no existe. Recarga los datos.")
            }
            Self::TableMismatch => {
                "La tabla no coincide con los datos cargados. Recarga los datos e intenta de nuevo."
                    .to_string()
            }
            Self::IdsExhausted => {
                "No quedan IDs disponibles para nuevos productos.".to_string()
            }
            Self::Store(e) if e.is_conflict() => {
                "Los datos cambiaron en GitHub desde que se cargaron. Recarga los datos e intenta de nuevo."
                    .to_string()
            }
            Self::Store(_) => "No se pudo guardar en GitHub. Intenta de nuevo.".to_string(),
        }
    }
}

/// Fields of the new product form.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub line: String,
    pub subtype: Option<String>,
    pub price: Price,
    pub stock: u32,
    pub description: String,
    pub image: Option<ImageUpload>,
}

/// One row of the bulk edit table. Every field except the id is editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEdit {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub stock: u32,
    pub image_path: Option<String>,
    pub description: String,
}

impl ProductEdit {
    fn apply_to(&self, product: &Product) -> Product {
        Product {
            id: product.id,
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            price: self.price,
            stock: self.stock,
            image_path: self
                .image_path
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            description: self.description.clone(),
        }
    }
}

/// Result of a bulk edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOutcome {
    /// The table matched the snapshot; nothing was written.
    Unchanged,
    /// The table was saved with this many edited products.
    Saved { changed: usize },
}

/// Product and category stores for one admin request.
pub struct Inventory {
    products: RecordStore<Products>,
    categories: RecordStore<Categories>,
}

impl Inventory {
    /// Resume from session snapshots, loading whatever is missing.
    ///
    /// # Errors
    ///
    /// Returns the load failure of a collection without a snapshot.
    pub async fn open(
        repository: &Repository,
        products: Option<Snapshot<Vec<Product>>>,
        categories: Option<Snapshot<CategoryTree>>,
    ) -> Result<Self, StoreError> {
        let products = match products {
            Some(snapshot) => repository.store_from::<Products>(snapshot),
            None => {
                let mut store = repository.store::<Products>();
                store.load().await?;
                store
            }
        };
        let categories = match categories {
            Some(snapshot) => repository.store_from::<Categories>(snapshot),
            None => {
                let mut store = repository.store::<Categories>();
                store.load().await?;
                store
            }
        };
        Ok(Self {
            products,
            categories,
        })
    }

    /// Load both collections fresh from the repository.
    ///
    /// # Errors
    ///
    /// Returns the first load failure.
    pub async fn reload(repository: &Repository) -> Result<Self, StoreError> {
        Self::open(repository, None, None).await
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        self.products.data()
    }

    #[must_use]
    pub const fn categories(&self) -> &CategoryTree {
        self.categories.data()
    }

    #[must_use]
    pub fn product_snapshot(&self) -> Option<Snapshot<Vec<Product>>> {
        self.products.snapshot()
    }

    #[must_use]
    pub fn category_snapshot(&self) -> Option<Snapshot<CategoryTree>> {
        self.categories.snapshot()
    }

    /// Validate and save a new product, uploading its image first.
    ///
    /// The image is uploaded before the product table is written; a failed
    /// upload aborts without touching the table.
    ///
    /// # Errors
    ///
    /// Returns a validation, category, image, or save error.
    #[instrument(skip(self, client, draft), fields(name = %draft.name, line = %draft.line))]
    pub async fn create_product(
        &mut self,
        client: &dyn ContentClient,
        draft: ProductDraft,
    ) -> Result<Product, InventoryError> {
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(InventoryError::NameRequired);
        }
        if draft.price.is_zero() {
            return Err(InventoryError::PriceRequired);
        }
        let category = self
            .categories
            .data()
            .resolve(draft.line.trim(), draft.subtype.as_deref())?;
        let id = next_product_id(self.products.data()).ok_or(InventoryError::IdsExhausted)?;

        let image_path = match &draft.image {
            Some(upload) => Some(upload_image(client, upload).await?),
            None => None,
        };

        let new_product = NewProduct {
            name,
            category,
            price: draft.price,
            stock: draft.stock,
            image_path,
            description: draft.description.trim().to_string(),
        };
        let product = self.products.mutate(|products| {
            let product = new_product.with_id(id);
            products.push(product.clone());
            product
        })?;

        self.products
            .save(&format!(
                "Añadido producto: {} ({})",
                product.name, product.category
            ))
            .await?;
        info!(id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace the product table with the edited rows.
    ///
    /// Row `i` edits product `i`; the table may hold repeated ids, so the id
    /// only confirms the row lines up. Nothing is written when no row differs.
    ///
    /// # Errors
    ///
    /// Returns `TableMismatch` if the rows do not line up with the loaded
    /// table, `NameRequired` for an empty name, or the save failure.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn apply_bulk_edit(
        &mut self,
        rows: &[ProductEdit],
    ) -> Result<BulkOutcome, InventoryError> {
        let current = self.products.data();
        if rows.len() != current.len() || rows.iter().zip(current).any(|(r, p)| r.id != p.id) {
            return Err(InventoryError::TableMismatch);
        }
        if rows.iter().any(|r| r.name.trim().is_empty()) {
            return Err(InventoryError::NameRequired);
        }

        let edited: Vec<Product> = rows
            .iter()
            .zip(current)
            .map(|(row, product)| row.apply_to(product))
            .collect();
        let changed = edited
            .iter()
            .zip(current)
            .filter(|(edited, original)| edited != original)
            .count();
        if changed == 0 {
            return Ok(BulkOutcome::Unchanged);
        }

        self.products.mutate(|products| *products = edited)?;
        self.products.save(BULK_EDIT_MESSAGE).await?;
        info!(changed, "Bulk edit saved");
        Ok(BulkOutcome::Saved { changed })
    }

    /// Remove a product by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or the save failure.
    #[instrument(skip(self))]
    pub async fn delete_product(&mut self, id: ProductId) -> Result<Product, InventoryError> {
        let removed = self.products.mutate(|products| {
            let index = products.iter().position(|p| p.id == id)?;
            Some(products.remove(index))
        })?;
        let removed = removed.ok_or(InventoryError::NotFound(id))?;

        self.products
            .save(&format!("Eliminado producto: {}", removed.name))
            .await?;
        info!(name = %removed.name, "Product deleted");
        Ok(removed)
    }

    /// Add a category line, optionally with its first subtype.
    ///
    /// # Errors
    ///
    /// Returns a category error (duplicate, invalid name) or the save failure.
    #[instrument(skip(self))]
    pub async fn add_line(
        &mut self,
        name: &str,
        first_subtype: Option<&str>,
    ) -> Result<(), InventoryError> {
        self.categories
            .mutate(|tree| tree.add_line(name, first_subtype))??;
        self.categories.save(CATEGORY_MESSAGE).await?;
        Ok(())
    }

    /// Add a subtype under an existing line.
    ///
    /// # Errors
    ///
    /// Returns a category error (unknown line, duplicate) or the save failure.
    #[instrument(skip(self))]
    pub async fn add_subtype(&mut self, line: &str, subtype: &str) -> Result<(), InventoryError> {
        self.categories
            .mutate(|tree| tree.add_subtype(line, subtype))??;
        self.categories.save(CATEGORY_MESSAGE).await?;
        Ok(())
    }
}
