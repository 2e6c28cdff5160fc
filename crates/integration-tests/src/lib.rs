//! Integration tests for Glint Accesorios.
//!
//! Both applications run in-process against one shared
//! [`MemoryContentClient`], so an edit committed by the admin is what the
//! storefront reads next.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p glint-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::IpAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header, request::Builder};
use glint_admin::config::AdminConfig;
use glint_admin::services::Sha256CredentialStore;
use glint_content::{MemoryContentClient, Repository};
use glint_storefront::config::StorefrontConfig;
use secrecy::SecretString;
use tower::ServiceExt;
use url::Url;

/// Admin login used by every test.
pub const ADMIN_USERNAME: &str = "admin";
/// Plaintext admin password.
pub const ADMIN_PASSWORD: &str = "password";
/// SHA-256 of [`ADMIN_PASSWORD`].
pub const ADMIN_PASSWORD_SHA256: &str =
    "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";
/// Base URL images are served from.
pub const IMAGE_BASE_URL: &str = "https://raw.githubusercontent.com/glint/tienda/main/";

const BOUNDARY: &str = "glint-integration";

/// Build an admin router over `client`.
#[must_use]
pub fn admin_app(client: &MemoryContentClient) -> Router {
    let config = AdminConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 3001,
        base_url: "http://localhost:3001".to_string(),
        admin_username: ADMIN_USERNAME.to_string(),
        admin_password_sha256: SecretString::from(ADMIN_PASSWORD_SHA256),
        sentry_dsn: None,
        sentry_environment: None,
    };
    let credentials = Arc::new(Sha256CredentialStore::from_config(&config));
    let state = glint_admin::state::AppState::new(
        config,
        Repository::new(Arc::new(client.clone())),
        credentials,
    );
    glint_admin::app(state)
}

/// Build a storefront router over `client`.
///
/// Each call starts with an empty catalog cache.
///
/// # Panics
///
/// Panics if [`IMAGE_BASE_URL`] does not parse.
#[must_use]
#[allow(clippy::expect_used)]
pub fn storefront_app(client: &MemoryContentClient) -> Router {
    let config = StorefrontConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        image_base_url: Url::parse(IMAGE_BASE_URL).expect("valid image base URL"),
        sentry_dsn: None,
        sentry_environment: None,
    };
    let state = glint_storefront::state::AppState::new(
        config,
        Repository::new(Arc::new(client.clone())),
    );
    glint_storefront::app(state)
}

/// One browser: a router plus the session cookie it was handed.
pub struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    #[must_use]
    pub const fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    /// Send a request, remembering any session cookie in the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    #[allow(clippy::expect_used)]
    pub async fn send(&mut self, builder: Builder, body: Body) -> Response<Body> {
        let builder = match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        };
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).expect("valid request"))
            .await
            .expect("router is infallible");
        if let Some(pair) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
        {
            self.cookie = Some(pair.to_string());
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri), Body::empty()).await
    }

    pub async fn post_form(&mut self, uri: &str, body: &str) -> Response<Body> {
        self.send(
            Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(body.to_string()),
        )
        .await
    }

    /// Post a multipart form with text fields and an optional image part.
    pub async fn post_multipart(
        &mut self,
        uri: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
    ) -> Response<Body> {
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

        self.send(
            Request::post(uri).header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ),
            Body::from(body),
        )
        .await
    }

    /// Log in as the admin.
    pub async fn login(&mut self) -> Response<Body> {
        self.post_form(
            "/auth/login",
            &format!("username={ADMIN_USERNAME}&password={ADMIN_PASSWORD}"),
        )
        .await
    }

    /// GET `uri` and return the body as text.
    pub async fn page(&mut self, uri: &str) -> String {
        let response = self.get(uri).await;
        body_text(response).await
    }
}

/// Read a response body as text.
///
/// # Panics
///
/// Panics if the body cannot be read as UTF-8.
#[allow(clippy::expect_used)]
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
