//! Inventory route handlers.
//!
//! Every write handler follows the same shape: resume the inventory from the
//! session snapshots, run one operation, store the new snapshots, queue a
//! flash message, and redirect back to the inventory page.

use std::collections::HashMap;
use std::str::FromStr;

use askama::Template;
use axum::{
    Form,
    extract::{Multipart, Path, State},
    response::{Html, Redirect},
};
use glint_core::{CategoryLine, CategoryPath, Price, Product, ProductId};
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::Flash;
use crate::models::session::{load_snapshots, save_snapshots, set_flash, take_flash};
use crate::services::{
    BulkOutcome, ImageUpload, Inventory, InventoryError, ProductDraft, ProductEdit,
};
use crate::state::AppState;

/// A product row in the inventory table.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    /// Price as typed in the edit field (`"1500.5"`).
    pub price: String,
    pub price_display: String,
    pub stock: u32,
    pub image_path: String,
    pub description: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price.to_record_string(),
            price_display: product.price.display(),
            stock: product.stock,
            image_path: product.image_path.clone().unwrap_or_default(),
            description: product.description.clone(),
        }
    }
}

/// Inventory page template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub admin_username: String,
    pub flash: Option<Flash>,
    pub products: Vec<ProductRow>,
    pub lines: Vec<CategoryLine>,
    /// Values for the category select of the new product form.
    pub category_options: Vec<String>,
}

/// Inventory page.
///
/// GET /products
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>> {
    let inventory = open_inventory(&state, &session).await?;
    save_snapshots(&session, &inventory).await?;
    let flash = take_flash(&session).await?;

    let lines = inventory.categories().lines().to_vec();
    let category_options = lines
        .iter()
        .flat_map(|line| {
            if line.subtypes.is_empty() {
                vec![CategoryPath::compose(&line.name, None)]
            } else {
                line.subtypes
                    .iter()
                    .map(|subtype| CategoryPath::compose(&line.name, Some(subtype)))
                    .collect()
            }
        })
        .collect();

    let template = ProductsIndexTemplate {
        admin_username: admin.username,
        flash,
        products: inventory.products().iter().map(ProductRow::from).collect(),
        lines,
        category_options,
    };
    Ok(Html(template.render()?))
}

/// Create a product from the multipart form.
///
/// POST /products
#[instrument(skip_all)]
pub async fn create(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect> {
    let form = read_product_form(multipart).await?;
    let mut inventory = open_inventory(&state, &session).await?;

    let flash = match form.into_draft() {
        Ok(draft) => match inventory
            .create_product(state.repository().client().as_ref(), draft)
            .await
        {
            Ok(product) => Flash::success(format!(
                "Producto '{}' agregado con éxito.",
                product.name
            )),
            Err(e) => failure_flash(&e),
        },
        Err(message) => Flash::error(message),
    };

    finish(&session, &inventory, flash).await
}

/// Save the edited inventory table.
///
/// POST /products/bulk
#[instrument(skip_all)]
pub async fn bulk_update(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect> {
    let mut inventory = open_inventory(&state, &session).await?;

    let flash = match parse_bulk_rows(&pairs) {
        Ok(rows) => match inventory.apply_bulk_edit(&rows).await {
            Ok(BulkOutcome::Unchanged) => Flash::info("No hay cambios para guardar."),
            Ok(BulkOutcome::Saved { changed }) => Flash::success(format!(
                "Inventario actualizado en GitHub ({changed} productos modificados)."
            )),
            Err(e) => failure_flash(&e),
        },
        Err(message) => Flash::error(message),
    };

    finish(&session, &inventory, flash).await
}

/// Delete a product by id.
///
/// POST /products/{id}/delete
#[instrument(skip_all, fields(id = %id))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    let mut inventory = open_inventory(&state, &session).await?;

    let flash = match inventory.delete_product(id).await {
        Ok(product) => Flash::success(format!(
            "Producto '{}' eliminado del listado.",
            product.name
        )),
        Err(e) => failure_flash(&e),
    };

    finish(&session, &inventory, flash).await
}

/// Resume the inventory from the session, loading anything not yet cached.
pub(super) async fn open_inventory(state: &AppState, session: &Session) -> Result<Inventory> {
    let (products, categories) = load_snapshots(session).await?;
    Ok(Inventory::open(state.repository(), products, categories).await?)
}

/// Store snapshots and the flash message, then return to the inventory page.
pub(super) async fn finish(session: &Session, inventory: &Inventory, flash: Flash) -> Result<Redirect> {
    save_snapshots(session, inventory).await?;
    set_flash(session, flash).await?;
    Ok(Redirect::to("/products"))
}

/// Banner for a failed inventory operation.
pub(super) fn failure_flash(error: &InventoryError) -> Flash {
    if error.is_server_error() {
        let event_id = sentry::capture_error(error);
        tracing::error!(error = %error, sentry_event_id = %event_id, "Inventory operation failed");
    } else {
        tracing::warn!(error = %error, "Inventory operation rejected");
    }

    if error.is_duplicate() {
        Flash::warning(error.user_message())
    } else {
        Flash::error(error.user_message())
    }
}

/// Raw fields of the new product form.
#[derive(Debug, Default)]
struct ProductForm {
    name: String,
    category: String,
    price: String,
    stock: String,
    description: String,
    image: Option<ImageUpload>,
}

impl ProductForm {
    fn into_draft(self) -> std::result::Result<ProductDraft, String> {
        let path = CategoryPath::parse(&self.category);
        Ok(ProductDraft {
            name: self.name,
            line: path.line,
            subtype: path.subtype,
            price: parse_price(&self.price)?,
            stock: parse_stock(&self.stock)?,
            description: normalize_newlines(&self.description),
            image: self.image,
        })
    }
}

async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm> {
    let mut form = ProductForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            // Browsers send an empty part when no file was chosen.
            if !file_name.is_empty() && !bytes.is_empty() {
                form.image = Some(ImageUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        match name.as_str() {
            "name" => form.name = value,
            "category" => form.category = value,
            "price" => form.price = value,
            "stock" => form.stock = value,
            "description" => form.description = value,
            _ => {}
        }
    }
    Ok(form)
}

/// Parse a price typed by the admin. Empty means zero.
fn parse_price(raw: &str) -> std::result::Result<Price, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Price::ZERO);
    }
    Decimal::from_str(raw)
        .map(Price::new)
        .map_err(|_| format!("Precio inválido: {raw}"))
}

/// Parse a stock count typed by the admin. Empty means zero.
fn parse_stock(raw: &str) -> std::result::Result<u32, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u32>()
        .map_err(|_| format!("Stock inválido: {raw}"))
}

/// Browsers submit textarea line breaks as CRLF; the table stores LF.
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Rebuild the edit table from its form fields.
///
/// Each row posts a hidden `id` plus `<field>_<row>` inputs, where `row` is
/// the row's position in the table. Ids may repeat, so they never key a field.
fn parse_bulk_rows(pairs: &[(String, String)]) -> std::result::Result<Vec<ProductEdit>, String> {
    let fields: HashMap<&str, &str> = pairs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let field = |name: &str, row: usize| {
        fields
            .get(format!("{name}_{row}").as_str())
            .copied()
            .unwrap_or_default()
            .to_string()
    };

    pairs
        .iter()
        .filter(|(key, _)| key == "id")
        .enumerate()
        .map(|(row, (_, raw_id))| -> std::result::Result<ProductEdit, String> {
            let id = raw_id
                .parse::<ProductId>()
                .map_err(|_| format!("ID de producto inválido: {raw_id}"))?;
            Ok(ProductEdit {
                id,
                name: field("name", row),
                category: field("category", row),
                price: parse_price(&field("price", row))?,
                stock: parse_stock(&field("stock", row))?,
                image_path: Some(field("image_path", row)),
                description: normalize_newlines(&field("description", row)),
            })
        })
        .collect()
}
