//! Authentication route handlers for admin.
//!
//! Username and password login against the configured credentials. Each
//! session gets three attempts; after that the form stays locked until the
//! session expires.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin,
};
use crate::models::session::{login_attempts, record_failed_login, reset_login_attempts};
use crate::models::{CurrentAdmin, MAX_LOGIN_ATTEMPTS};
use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate {
    error: Option<String>,
    locked: bool,
}

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

/// Render the login page.
///
/// GET /auth/login
async fn login_page(
    OptionalAdminAuth(admin): OptionalAdminAuth,
    session: Session,
) -> Result<Response> {
    if admin.is_some() {
        return Ok(Redirect::to("/products").into_response());
    }
    let locked = login_attempts(&session).await? >= MAX_LOGIN_ATTEMPTS;
    let error = locked.then(|| "Máximos intentos alcanzados.".to_string());
    Ok(Html(LoginPageTemplate { error, locked }.render()?).into_response())
}

/// Check credentials and start an admin session.
///
/// POST /auth/login
#[instrument(skip(state, session, form), fields(username = %form.username))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if login_attempts(&session).await? >= MAX_LOGIN_ATTEMPTS {
        tracing::warn!("Login refused, attempts exhausted");
        return render_failure(StatusCode::TOO_MANY_REQUESTS, "Máximos intentos alcanzados.", true);
    }

    if state.credentials().verify(&form.username, &form.password) {
        reset_login_attempts(&session).await?;
        let admin = CurrentAdmin {
            username: form.username.trim().to_string(),
            logged_in_at: chrono::Utc::now(),
        };
        set_current_admin(&session, &admin).await?;
        set_sentry_user(&admin.username);
        tracing::info!("Admin logged in");
        return Ok(Redirect::to("/products").into_response());
    }

    let attempts = record_failed_login(&session).await?;
    tracing::warn!(attempts, "Invalid admin credentials");
    let locked = attempts >= MAX_LOGIN_ATTEMPTS;
    let mut message = format!("Credenciales inválidas. Intento {attempts} de {MAX_LOGIN_ATTEMPTS}.");
    if locked {
        message.push_str(" Máximos intentos alcanzados.");
    }
    render_failure(StatusCode::UNAUTHORIZED, &message, locked)
}

fn render_failure(status: StatusCode, message: &str, locked: bool) -> Result<Response> {
    let page = LoginPageTemplate {
        error: Some(message.to_string()),
        locked,
    };
    Ok((status, Html(page.render()?)).into_response())
}

/// Logout and clear session.
///
/// Only a logged-in admin can flush the session; anyone else is sent to the
/// login page with their attempt counter intact.
///
/// POST /auth/logout
#[instrument(skip_all, fields(admin = %admin.username))]
async fn logout(RequireAdminAuth(admin): RequireAdminAuth, session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    tracing::info!("Admin logged out");
    Ok(Redirect::to("/auth/login"))
}
