//! Integration tests for Aurelia.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p aurelia-cli -- migrate
//! cargo run -p aurelia-cli -- seed categories
//! cargo run -p aurelia-cli -- admin create -e admin@aurelia.test -p <password>
//!
//! # Start the server, then
//! cargo test -p aurelia-integration-tests -- --ignored
//! ```
//!
//! Tests are `#[ignore]`d by default because they need a live server; the
//! helpers here give each test its own shopper account and admin session.

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the server (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("AURELIA_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A cookie-keeping HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique throwaway email for account isolation between tests.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@aurelia.test", Uuid::new_v4().simple())
}

/// Register a fresh shopper; the client keeps the auth cookie.
///
/// # Panics
///
/// Panics if registration does not succeed.
pub async fn register_shopper(client: &Client) -> Value {
    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "name": "Test Shopper",
            "email": unique_email("shopper"),
            "password": "test-password-1",
        }))
        .send()
        .await
        .expect("register request failed");

    assert!(
        resp.status().is_success(),
        "registration failed: {}",
        resp.status()
    );
    resp.json().await.expect("register response not JSON")
}

/// Login as the admin provisioned for the test run; the client keeps the
/// admin cookie. Credentials come from `AURELIA_ADMIN_EMAIL` and
/// `AURELIA_ADMIN_PASSWORD`.
///
/// # Panics
///
/// Panics if the login does not succeed.
pub async fn login_admin(client: &Client) {
    let email = std::env::var("AURELIA_ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@aurelia.test".to_string());
    let password = std::env::var("AURELIA_ADMIN_PASSWORD")
        .unwrap_or_else(|_| "integration-admin-pw".to_string());

    let resp = client
        .post(format!("{}/admin/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("admin login request failed");

    assert!(
        resp.status().is_success(),
        "admin login failed: {}",
        resp.status()
    );
}

/// Create a product through the admin API and return it.
///
/// Picks the first existing category for the product.
///
/// # Panics
///
/// Panics if no category exists or the creation fails.
pub async fn create_product(admin: &Client, name: &str, price: &str, stock: i32) -> Value {
    let categories: Vec<Value> = admin
        .get(format!("{}/categories", base_url()))
        .send()
        .await
        .expect("category list request failed")
        .json()
        .await
        .expect("category list not JSON");
    let category_id = categories
        .first()
        .expect("no categories seeded; run `aurelia-cli seed categories`")["id"]
        .clone();

    let resp = admin
        .post(format!("{}/admin/products", base_url()))
        .json(&json!({
            "name": name,
            "description": "integration test product",
            "price": price,
            "categoryId": category_id,
            "images": ["/test.webp"],
            "stock": stock,
        }))
        .send()
        .await
        .expect("product create request failed");

    assert!(
        resp.status().is_success(),
        "product create failed: {}",
        resp.status()
    );
    resp.json().await.expect("product response not JSON")
}

/// A complete shipping address for order placement bodies.
#[must_use]
pub fn test_address() -> Value {
    json!({
        "name": "Test Shopper",
        "email": "shipping@aurelia.test",
        "phone": "555-0100",
        "address": "1 Test Lane",
        "city": "Testville",
        "zipCode": "00001",
        "country": "US",
    })
}
