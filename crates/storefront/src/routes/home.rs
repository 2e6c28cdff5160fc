//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use tower_sessions::Session;
use tracing::instrument;

use crate::catalog::{CatalogFilter, Listing};
use crate::error::Result;
use crate::filters;
use crate::models::load_cart;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub listing: Listing,
    pub cart_count: usize,
}

/// Display the product grid.
#[instrument(skip(state, session))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    Query(filter): Query<CatalogFilter>,
) -> Result<HomeTemplate> {
    let products = state.catalog().products(state.repository()).await;
    let listing = Listing::build(&products, filter, &state.config().image_base_url);
    let cart = load_cart(&session).await?;

    Ok(HomeTemplate {
        listing,
        cart_count: cart.item_count(),
    })
}
