//! Cart route handlers.
//!
//! The cart lives in the session as a list of `{name, price}` lines. Adding
//! looks the product up by id in the current catalog and copies its name and
//! price; nothing else ties a cart line to the product table.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use glint_core::{CartGroup, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::{load_cart, save_cart};
use crate::state::AppState;

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub groups: Vec<CartGroup>,
    pub total: String,
    pub cart_count: usize,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Display the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<CartTemplate> {
    let cart = load_cart(&session).await?;
    Ok(CartTemplate {
        groups: cart.grouped(),
        total: cart.total().display(),
        cart_count: cart.item_count(),
    })
}

/// Add one unit of an available product to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<impl IntoResponse> {
    let products = state.catalog().products(state.repository()).await;
    let product = products
        .iter()
        .find(|p| p.id == form.product_id && p.is_available())
        .ok_or_else(|| AppError::NotFound(format!("producto {}", form.product_id)))?;

    let mut cart = load_cart(&session).await?;
    cart.add(product.name.clone(), product.price);
    save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Added product to cart", Some(&[("name", product.name.as_str())]));
    tracing::info!(product_id = %product.id, items = cart.item_count(), "Added to cart");

    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<impl IntoResponse> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/cart"))
}
