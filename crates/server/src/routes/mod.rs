//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (pings the database)
//!
//! # Catalog
//! GET  /products                    - Product listing (?category=slug&featured=bool)
//! GET  /products/{id}               - Product detail
//! GET  /categories                  - Category listing
//! GET  /settings                    - Public pricing settings
//! POST /discount                    - Validate a discount code
//!
//! # Auth
//! POST /auth/register               - Create account, sets auth cookie
//! POST /auth/login                  - Login, sets auth cookie
//! POST /auth/logout                 - Clear auth cookie
//! GET  /auth/me                     - Current account
//!
//! # Cart and wishlist (require auth)
//! GET|POST|PUT|DELETE /cart         - Cart CRUD (DELETE without productId clears)
//! GET|POST /wishlist                - Wishlist list/add
//! DELETE /wishlist/{productId}      - Wishlist remove
//!
//! # Orders
//! POST /orders                      - Place an order (atomic stock reservation)
//! GET  /orders                      - Own order history
//! GET  /orders/{id}                 - Own order detail
//! GET  /orders/{id}/invoice         - Own order invoice
//! GET  /orders/track/{orderNumber}  - Public tracking by order number
//!
//! # Admin (require admin cookie)
//! POST /admin/login                 - Back-office login
//! POST /admin/logout                - Back-office logout
//! GET|POST /admin/products          - Catalog management
//! PUT|DELETE /admin/products/{id}
//! POST /admin/categories            - Category management
//! DELETE /admin/categories/{id}
//! GET  /admin/orders                - All orders
//! GET|PUT /admin/orders/{id}        - Order detail / status transition
//! GET  /admin/stock                 - Inventory screen (stock ascending)
//! PUT  /admin/stock/{id}            - Absolute stock update
//! GET|PUT /admin/settings           - Full settings, discount included
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod discount;
pub mod orders;
pub mod products;
pub mod settings;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::list))
        .route("/track/{order_number}", get(orders::track))
        .route("/{id}", get(orders::show))
        .route("/{id}/invoice", get(orders::invoice))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(admin::login))
        .route("/logout", post(admin::logout))
        .route("/products", get(admin::list_products).post(admin::create_product))
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/categories", post(admin::create_category))
        .route("/categories/{id}", delete(admin::delete_category))
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}", get(admin::show_order).put(admin::update_order))
        .route("/stock", get(admin::list_stock))
        .route("/stock/{id}", put(admin::set_stock))
        .route("/settings", get(admin::show_settings).put(admin::update_settings))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/products", get(products::list))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(categories::list))
        .route("/settings", get(settings::show))
        .route("/discount", post(discount::validate))
        // Cart
        .route(
            "/cart",
            get(cart::list)
                .post(cart::add)
                .put(cart::update)
                .delete(cart::remove),
        )
        // Wishlist
        .route("/wishlist", get(wishlist::list).post(wishlist::add))
        .route("/wishlist/{product_id}", delete(wishlist::remove))
        // Orders
        .nest("/orders", order_routes())
        // Auth
        .nest("/auth", auth_routes())
        // Back office
        .nest("/admin", admin_routes())
}
