//! Integration tests for two admins editing the same files.
//!
//! Every save is conditioned on the version token read when the admin's
//! session loaded the data, so the second of two overlapping edits fails
//! instead of overwriting the first.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use glint_content::{Collection, MemoryContentClient, Products};
use glint_core::codec::{decode_products, encode_products};
use glint_core::{Price, Product, ProductId};
use glint_integration_tests::{Browser, admin_app, storefront_app};

fn product(id: i32, name: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: "Plata - Aros".to_string(),
        price: Price::from_units(100),
        stock: 3,
        image_path: None,
        description: String::new(),
    }
}

fn seeded() -> MemoryContentClient {
    MemoryContentClient::new().with_file(
        Products::PATH,
        encode_products(&[product(1, "Aro Luna"), product(2, "Aro Sol")]).unwrap(),
    )
}

fn stored_names(client: &MemoryContentClient) -> Vec<String> {
    decode_products(&client.file(Products::PATH).unwrap())
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect()
}

#[tokio::test]
async fn test_second_admin_conflicts_until_reload() {
    let client = seeded();
    let mut first = Browser::new(admin_app(&client));
    let mut second = Browser::new(admin_app(&client));
    first.login().await;
    second.login().await;

    // Both sessions load the same version
    assert!(first.page("/products").await.contains("Aro Luna"));
    assert!(second.page("/products").await.contains("Aro Luna"));

    first.post_form("/products/1/delete", "").await;
    assert_eq!(stored_names(&client), ["Aro Sol"]);

    // The stale session is refused and the committed file is untouched
    let response = second.post_form("/products/2/delete", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(second.page("/products").await.contains("Recarga los datos"));
    assert_eq!(stored_names(&client), ["Aro Sol"]);

    // After reloading the second admin works from the new version
    second.post_form("/reload", "").await;
    let page = second.page("/products").await;
    assert!(page.contains("Datos recargados"));
    assert!(!page.contains("Aro Luna"));

    second.post_form("/products/2/delete", "").await;
    assert!(stored_names(&client).is_empty());

    let mut shopper = Browser::new(storefront_app(&client));
    let page = shopper.page("/").await;
    assert!(!page.contains("Aro Luna"));
    assert!(!page.contains("Aro Sol"));
}

#[tokio::test]
async fn test_category_added_by_one_admin_needs_reload_elsewhere() {
    let client = seeded();
    let mut first = Browser::new(admin_app(&client));
    let mut second = Browser::new(admin_app(&client));
    first.login().await;
    second.login().await;
    first.page("/products").await;
    second.page("/products").await;

    first.post_form("/categories/lines", "name=Perlas&first_subtype=Collares").await;
    assert!(first.page("/products").await.contains("Perlas - Collares"));

    // Second session still holds the old tree
    second.post_form("/categories/subtypes", "line=Plata&subtype=Dijes").await;
    assert!(second.page("/products").await.contains("Recarga los datos"));

    second.post_form("/reload", "").await;
    second.post_form("/categories/subtypes", "line=Plata&subtype=Dijes").await;
    let page = second.page("/products").await;
    assert!(page.contains("Perlas - Collares"));
    assert!(page.contains("Plata - Dijes"));
}
