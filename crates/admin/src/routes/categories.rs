//! Category route handlers.
//!
//! The tree has one nesting level: lines, each with an ordered list of
//! subtypes. New lines may carry their first subtype.

use axum::{
    Form,
    extract::State,
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::products::{failure_flash, finish, open_inventory};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::Flash;
use crate::state::AppState;

/// New line form data.
#[derive(Debug, Deserialize)]
pub struct NewLineForm {
    pub name: String,
    #[serde(default)]
    pub first_subtype: Option<String>,
}

/// New subtype form data.
#[derive(Debug, Deserialize)]
pub struct NewSubtypeForm {
    pub line: String,
    pub subtype: String,
}

/// Add a category line.
///
/// POST /categories/lines
#[instrument(skip_all, fields(name = %form.name))]
pub async fn create_line(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NewLineForm>,
) -> Result<Redirect> {
    let mut inventory = open_inventory(&state, &session).await?;

    let flash = match inventory
        .add_line(&form.name, form.first_subtype.as_deref())
        .await
    {
        Ok(()) => Flash::success(format!("Categoría '{}' creada.", form.name.trim())),
        Err(e) => failure_flash(&e),
    };

    finish(&session, &inventory, flash).await
}

/// Add a subtype under an existing line.
///
/// POST /categories/subtypes
#[instrument(skip_all, fields(line = %form.line, subtype = %form.subtype))]
pub async fn create_subtype(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NewSubtypeForm>,
) -> Result<Redirect> {
    let mut inventory = open_inventory(&state, &session).await?;

    let flash = match inventory.add_subtype(&form.line, &form.subtype).await {
        Ok(()) => Flash::success(format!(
            "Tipo '{}' agregado a {}.",
            form.subtype.trim(),
            form.line
        )),
        Err(e) => failure_flash(&e),
    };

    finish(&session, &inventory, flash).await
}
