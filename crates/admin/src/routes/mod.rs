//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Health check
//! GET  /                        - Redirect to /products
//!
//! # Auth
//! GET  /auth/login              - Login page
//! POST /auth/login              - Check credentials (3 attempts per session)
//! POST /auth/logout             - Logout
//!
//! # Inventory
//! GET  /products                - Inventory table and forms
//! POST /products                - Create product (multipart, optional image)
//! POST /products/bulk           - Save the edited table
//! POST /products/{id}/delete    - Delete product by id
//! POST /reload                  - Drop session snapshots and load fresh data
//!
//! # Categories
//! POST /categories/lines        - Add a line
//! POST /categories/subtypes     - Add a subtype to a line
//! ```

pub mod auth;
pub mod categories;
pub mod products;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::Flash;
use crate::models::session::clear_snapshots;
use crate::services::Inventory;
use crate::state::AppState;

/// Largest accepted product form, image included.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Create the inventory routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::index)
                .post(products::create)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/bulk", post(products::bulk_update))
        .route("/{id}/delete", post(products::delete))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/lines", post(categories::create_line))
        .route("/subtypes", post(categories::create_subtype))
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/products") }))
        .route("/reload", post(reload))
        .merge(auth::router())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
}

/// Discard the session snapshots and load both collections again.
///
/// POST /reload
#[instrument(skip_all)]
async fn reload(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Redirect> {
    clear_snapshots(&session).await?;
    let inventory = Inventory::reload(state.repository()).await?;
    products::finish(
        &session,
        &inventory,
        Flash::info("Datos recargados desde GitHub."),
    )
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::net::IpAddr;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use glint_content::{Collection, MemoryContentClient, Products, Repository};
    use glint_core::codec::{decode_products, encode_products};
    use glint_core::{Price, Product, ProductId};
    use secrecy::SecretString;
    use tower::ServiceExt;

    use crate::config::AdminConfig;
    use crate::services::Sha256CredentialStore;
    use crate::state::AppState;

    /// SHA-256 of "password".
    const PASSWORD_DIGEST: &str =
        "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";
    const BOUNDARY: &str = "glint-boundary";

    fn config() -> AdminConfig {
        AdminConfig {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            admin_username: "admin".to_string(),
            admin_password_sha256: SecretString::from(PASSWORD_DIGEST),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    fn product(id: i32, name: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: category.to_string(),
            price: Price::from_units(100),
            stock: 5,
            image_path: None,
            description: String::new(),
        }
    }

    /// A router plus a cookie jar holding one browser session.
    struct Browser {
        app: axum::Router,
        cookie: Option<String>,
    }

    impl Browser {
        fn new(client: &MemoryContentClient) -> Self {
            let config = config();
            let credentials = Arc::new(Sha256CredentialStore::from_config(&config));
            let state = AppState::new(
                config,
                Repository::new(Arc::new(client.clone())),
                credentials,
            );
            Self {
                app: crate::app(state),
                cookie: None,
            }
        }

        async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> Response {
            let builder = match &self.cookie {
                Some(cookie) => builder.header(header::COOKIE, cookie),
                None => builder,
            };
            let response = self
                .app
                .clone()
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap();
            if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
                let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
                self.cookie = Some(pair.to_string());
            }
            response
        }

        async fn get(&mut self, uri: &str) -> Response {
            self.send(Request::get(uri), Body::empty()).await
        }

        async fn post_form(&mut self, uri: &str, body: &str) -> Response {
            self.send(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
                Body::from(body.to_string()),
            )
            .await
        }

        async fn post_multipart(&mut self, uri: &str, body: String) -> Response {
            self.send(
                Request::post(uri).header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                ),
                Body::from(body),
            )
            .await
        }

        async fn login(&mut self) {
            let response = self
                .post_form("/auth/login", "username=admin&password=password")
                .await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&response), "/products");
        }

        async fn products_page(&mut self) -> String {
            let response = self.get("/products").await;
            assert_eq!(response.status(), StatusCode::OK);
            body_text(response).await
        }
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn multipart(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> String {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        if let Some((file_name, bytes)) = image {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/jpeg\r\n\r\n{}\r\n",
                String::from_utf8_lossy(bytes)
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn stored_products(client: &MemoryContentClient) -> Vec<Product> {
        decode_products(&client.file(Products::PATH).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let mut browser = Browser::new(&MemoryContentClient::new());
        let response = browser.get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_inventory_requires_login() {
        let mut browser = Browser::new(&MemoryContentClient::new());

        let response = browser.get("/").await;
        assert_eq!(location(&response), "/products");

        let response = browser.get("/products").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth/login");

        let response = browser.post_form("/products/1/delete", "").await;
        assert_eq!(location(&response), "/auth/login");
    }

    #[tokio::test]
    async fn test_login_locks_after_three_failures() {
        let mut browser = Browser::new(&MemoryContentClient::new());

        for attempt in 1..=3 {
            let response = browser
                .post_form("/auth/login", "username=admin&password=wrong")
                .await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let page = body_text(response).await;
            assert!(page.contains(&format!("Intento {attempt} de 3")));
        }

        let response = browser
            .post_form("/auth/login", "username=admin&password=password")
            .await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(body_text(response).await.contains("Máximos intentos alcanzados."));

        let response = browser.get("/products").await;
        assert_eq!(location(&response), "/auth/login");
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let mut browser = Browser::new(&MemoryContentClient::new());
        browser.login().await;
        browser.products_page().await;

        let response = browser.post_form("/auth/logout", "").await;
        assert_eq!(location(&response), "/auth/login");

        let response = browser.get("/products").await;
        assert_eq!(location(&response), "/auth/login");
    }

    #[tokio::test]
    async fn test_logout_does_not_reset_lockout() {
        let mut browser = Browser::new(&MemoryContentClient::new());
        for _ in 0..3 {
            browser
                .post_form("/auth/login", "username=admin&password=wrong")
                .await;
        }

        let response = browser.post_form("/auth/logout", "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth/login");

        let response = browser
            .post_form("/auth/login", "username=admin&password=password")
            .await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_create_product_with_image() {
        let client = MemoryContentClient::new();
        let mut browser = Browser::new(&client);
        browser.login().await;

        let body = multipart(
            &[
                ("name", "Aro X"),
                ("category", "Plata - Aros"),
                ("price", "100"),
                ("stock", "5"),
                ("description", "Hecho a mano"),
            ],
            Some(("aro x.jpg", b"jpeg-bytes")),
        );
        let response = browser.post_multipart("/products", body).await;
        assert_eq!(location(&response), "/products");

        let stored = stored_products(&client);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].category, "Plata - Aros");
        assert_eq!(stored[0].image_path.as_deref(), Some("img/aro-x.jpg"));
        assert!(client.file("img/aro-x.jpg").is_some());

        let page = browser.products_page().await;
        assert!(page.contains("agregado con éxito"));
        assert!(page.contains("Aro X"));
    }

    #[tokio::test]
    async fn test_create_product_requires_price() {
        let client = MemoryContentClient::new();
        let mut browser = Browser::new(&client);
        browser.login().await;

        let body = multipart(
            &[("name", "Aro X"), ("category", "Plata - Aros"), ("price", "0")],
            None,
        );
        browser.post_multipart("/products", body).await;

        assert!(client.file(Products::PATH).is_none());
        assert!(browser
            .products_page()
            .await
            .contains("El precio debe ser mayor que cero."));
    }

    #[tokio::test]
    async fn test_bulk_edit_without_changes() {
        let table = vec![product(1, "Aro X", "Plata - Aros")];
        let client =
            MemoryContentClient::new().with_file(Products::PATH, encode_products(&table).unwrap());
        let mut browser = Browser::new(&client);
        browser.login().await;
        browser.products_page().await;

        let form = "id=1&name_0=Aro+X&category_0=Plata+-+Aros&price_0=100&stock_0=5&image_path_0=&description_0=";
        browser.post_form("/products/bulk", form).await;

        assert!(client.commits().is_empty());
        assert!(browser.products_page().await.contains("No hay cambios para guardar."));

        let form = "id=1&name_0=Aro+X&category_0=Plata+-+Aros&price_0=120&stock_0=2&image_path_0=&description_0=";
        browser.post_form("/products/bulk", form).await;
        let stored = stored_products(&client);
        assert_eq!(stored[0].price, Price::from_units(120));
        assert_eq!(stored[0].stock, 2);
    }

    #[tokio::test]
    async fn test_bulk_edit_keeps_multiline_descriptions() {
        let mut aro = product(1, "Aro X", "Plata - Aros");
        aro.description = "Plata 925\nHecho a mano".to_string();
        let client = MemoryContentClient::new()
            .with_file(Products::PATH, encode_products(&[aro]).unwrap());
        let mut browser = Browser::new(&client);
        browser.login().await;

        let page = browser.products_page().await;
        assert!(page.contains("<textarea name=\"description_0\" form=\"bulk-form\">Plata 925\nHecho a mano</textarea>"));

        let form = "id=1&name_0=Aro+X&category_0=Plata+-+Aros&price_0=100&stock_0=5&image_path_0=&description_0=Plata+925%0D%0AHecho+a+mano";
        browser.post_form("/products/bulk", form).await;
        assert!(client.commits().is_empty());
        assert!(browser.products_page().await.contains("No hay cambios para guardar."));

        let form = "id=1&name_0=Aro+X&category_0=Plata+-+Aros&price_0=100&stock_0=5&image_path_0=&description_0=Plata+925%0D%0AHecho+a+mano%0D%0ASin+n%C3%ADquel";
        browser.post_form("/products/bulk", form).await;
        assert_eq!(
            stored_products(&client)[0].description,
            "Plata 925\nHecho a mano\nSin níquel"
        );
    }

    #[tokio::test]
    async fn test_delete_conflict_then_reload() {
        let table = vec![product(1, "Aro X", "Plata - Aros"), product(2, "Collar", "Plata - Aros")];
        let client =
            MemoryContentClient::new().with_file(Products::PATH, encode_products(&table).unwrap());
        let mut browser = Browser::new(&client);
        browser.login().await;
        browser.products_page().await;

        // Someone else edits the table after this session loaded it.
        let edited = vec![product(1, "Aro X", "Plata - Aros")];
        client.seed(Products::PATH, encode_products(&edited).unwrap());

        browser.post_form("/products/1/delete", "").await;
        assert!(browser.products_page().await.contains("Recarga los datos"));
        assert_eq!(stored_products(&client), edited);

        let response = browser.post_form("/reload", "").await;
        assert_eq!(location(&response), "/products");
        assert!(browser.products_page().await.contains("Datos recargados"));

        browser.post_form("/products/1/delete", "").await;
        assert!(stored_products(&client).is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_line_warns() {
        let client = MemoryContentClient::new();
        let mut browser = Browser::new(&client);
        browser.login().await;

        browser
            .post_form("/categories/lines", "name=Plata&first_subtype=")
            .await;
        let page = browser.products_page().await;
        assert!(page.contains("flash-warning"));
        assert!(page.contains("Esa categoría ya existe."));

        browser
            .post_form("/categories/subtypes", "line=Plata&subtype=Dijes")
            .await;
        let page = browser.products_page().await;
        assert!(page.contains("Plata - Dijes"));
        assert_eq!(client.commits().len(), 1);
    }
}
