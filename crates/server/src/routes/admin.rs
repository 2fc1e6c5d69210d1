//! Back-office routes.
//!
//! Everything here except login requires the admin cookie. Order status
//! updates enforce the forward-only transition rules; illegal transitions
//! are rejected with 409 and leave the order untouched.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use aurelia_core::{CategoryId, OrderId, OrderStatus, PaymentStatus, ProductId};

use crate::db::{
    CategoryRepository, OrderRepository, ProductRepository, RepositoryError, SettingsRepository,
    products::ProductInput,
};
use crate::error::{AppError, Result};
use crate::middleware::AdminSession;
use crate::middleware::auth::{ADMIN_COOKIE, issue_admin_cookie, removal_cookie};
use crate::models::{Product, Settings};
use crate::services::AuthService;
use crate::state::AppState;

use super::categories::CategoryResponse;
use super::orders::OrderResponse;
use super::products::ProductResponse;

// ============================================================================
// Auth
// ============================================================================

/// Admin login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login to the back office.
///
/// POST /admin/login
///
/// # Errors
///
/// Returns `AppError::Auth` if the credentials are wrong.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<serde_json::Value>)> {
    let admin = AuthService::new(state.pool())
        .admin_login(&request.email, &request.password)
        .await?;

    tracing::info!(admin_id = %admin.id, "admin logged in");

    let cookie = issue_admin_cookie(&state, admin.id)?;
    Ok((
        jar.add(cookie),
        Json(serde_json::json!({ "email": admin.email.as_str() })),
    ))
}

/// Clear the admin cookie.
///
/// POST /admin/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    (
        jar.add(removal_cookie(ADMIN_COOKIE)),
        Json(serde_json::json!({ "message": "logged out" })),
    )
}

// ============================================================================
// Products
// ============================================================================

/// Product create/update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    #[serde(default)]
    pub images: Vec<String>,
    pub stock: i32,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
    #[serde(default)]
    pub featured: bool,
}

const fn default_low_stock_threshold() -> i32 {
    5
}

impl ProductRequest {
    fn into_input(self) -> Result<ProductInput> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("name is required".to_owned()));
        }
        if self.price <= Decimal::ZERO {
            return Err(AppError::BadRequest("price must be positive".to_owned()));
        }
        if self.stock < 0 {
            return Err(AppError::BadRequest("stock cannot be negative".to_owned()));
        }
        if self.low_stock_threshold < 0 {
            return Err(AppError::BadRequest(
                "low stock threshold cannot be negative".to_owned(),
            ));
        }
        if self.images.len() > Product::MAX_IMAGES {
            return Err(AppError::BadRequest(format!(
                "at most {} images allowed",
                Product::MAX_IMAGES
            )));
        }

        Ok(ProductInput {
            name: self.name.trim().to_owned(),
            description: self.description,
            price: self.price,
            category_id: self.category_id,
            images: self.images,
            stock: self.stock,
            low_stock_threshold: self.low_stock_threshold,
            featured: self.featured,
        })
    }
}

/// List all products for the catalog screen.
///
/// GET /admin/products
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn list_products(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
) -> Result<Json<Vec<ProductResponse>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// Create a product.
///
/// POST /admin/products
///
/// # Errors
///
/// Returns `AppError::BadRequest` on invalid fields.
pub async fn create_product(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Json(request): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let input = request.into_input()?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;

    tracing::info!(product_id = %product.id, name = %product.name, "product created");

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// Replace a product's fields.
///
/// PUT /admin/products/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if no product has this id.
pub async fn update_product(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<ProductId>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<ProductResponse>> {
    let input = request.into_input()?;
    let product = ProductRepository::new(state.pool())
        .update(id, &input)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("product {id}")),
            other => AppError::Database(other),
        })?;

    Ok(Json(ProductResponse::from(product)))
}

/// Delete a product.
///
/// DELETE /admin/products/{id}
///
/// Products referenced by historical orders cannot be deleted (the order
/// snapshots keep the foreign key alive); they get 409.
///
/// # Errors
///
/// Returns `AppError::NotFound` or `AppError::Conflict`.
pub async fn delete_product(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let deleted = ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Database(other),
        })?;

    if !deleted {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Categories
// ============================================================================

/// Category create request.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image: String,
}

/// Create a category.
///
/// POST /admin/categories
///
/// # Errors
///
/// Returns `AppError::Conflict` if the name or slug is taken.
pub async fn create_category(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    if request.name.trim().is_empty() || request.slug.trim().is_empty() {
        return Err(AppError::BadRequest("name and slug are required".to_owned()));
    }

    let category = CategoryRepository::new(state.pool())
        .create(request.name.trim(), request.slug.trim(), &request.image)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Database(other),
        })?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// Delete a category.
///
/// DELETE /admin/categories/{id}
///
/// Categories that still have products get 409.
///
/// # Errors
///
/// Returns `AppError::NotFound` or `AppError::Conflict`.
pub async fn delete_category(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    let deleted = CategoryRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Database(other),
        })?;

    if !deleted {
        return Err(AppError::NotFound(format!("category {id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Orders
// ============================================================================

/// Order status update request; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

/// List all orders, newest first.
///
/// GET /admin/orders
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn list_orders(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// Get one order.
///
/// GET /admin/orders/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if no order has this id.
pub async fn show_order(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(Json(OrderResponse::from(order)))
}

/// Update an order's fulfillment and/or payment status.
///
/// PUT /admin/orders/{id}
///
/// Fulfillment moves forward only (cancel allowed from any non-terminal
/// state); payment moves pending to paid only. Illegal transitions are
/// rejected with 409 and change nothing.
///
/// # Errors
///
/// Returns `AppError::Conflict` for an illegal transition, or when a
/// concurrent update changed the order after it was read.
pub async fn update_order(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>> {
    let repo = OrderRepository::new(state.pool());

    let (current_status, current_payment) = repo
        .get_status(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let next_status = request.status.unwrap_or(current_status);
    if next_status != current_status && !current_status.can_transition_to(next_status) {
        return Err(AppError::Conflict(format!(
            "cannot move order from {current_status} to {next_status}"
        )));
    }

    let next_payment = request.payment_status.unwrap_or(current_payment);
    if next_payment != current_payment && !current_payment.can_transition_to(next_payment) {
        return Err(AppError::Conflict(format!(
            "cannot move payment from {current_payment} to {next_payment}"
        )));
    }

    // Conditional on the statuses read above: if another admin committed
    // a change in between, nothing is written and the caller must retry
    // against the fresh state.
    let updated = repo
        .set_status(id, current_status, current_payment, next_status, next_payment)
        .await?;
    if !updated {
        return Err(AppError::Conflict(format!(
            "order {id} was updated concurrently"
        )));
    }

    tracing::info!(
        order_id = %id,
        status = %next_status,
        payment_status = %next_payment,
        "order status updated"
    );

    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(Json(OrderResponse::from(order)))
}

// ============================================================================
// Stock
// ============================================================================

/// Stock update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRequest {
    pub stock: i32,
    pub low_stock_threshold: Option<i32>,
}

/// List products ordered by stock for the inventory screen.
///
/// GET /admin/stock
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn list_stock(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
) -> Result<Json<Vec<ProductResponse>>> {
    let products = ProductRepository::new(state.pool()).list_by_stock().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// Set a product's stock to an absolute count.
///
/// PUT /admin/stock/{id}
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a negative count and
/// `AppError::NotFound` for an unknown product.
pub async fn set_stock(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<ProductId>,
    Json(request): Json<StockRequest>,
) -> Result<Json<ProductResponse>> {
    if request.stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".to_owned()));
    }
    if request.low_stock_threshold.is_some_and(|t| t < 0) {
        return Err(AppError::BadRequest(
            "low stock threshold cannot be negative".to_owned(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .set_stock(id, request.stock, request.low_stock_threshold)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("product {id}")),
            other => AppError::Database(other),
        })?;

    Ok(Json(ProductResponse::from(product)))
}

// ============================================================================
// Settings
// ============================================================================

/// Get the full settings record, discount configuration included.
///
/// GET /admin/settings
///
/// # Errors
///
/// Returns `AppError::Database` if the settings row cannot be read.
pub async fn show_settings(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
) -> Result<Json<Settings>> {
    let settings = SettingsRepository::new(state.pool()).get().await?;
    Ok(Json(settings))
}

/// Replace the settings record.
///
/// PUT /admin/settings
///
/// # Errors
///
/// Returns `AppError::BadRequest` for out-of-range values.
pub async fn update_settings(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>> {
    validate_settings(&settings)?;

    let updated = SettingsRepository::new(state.pool()).update(&settings).await?;

    tracing::info!(
        tax_rate = %updated.tax_rate,
        shipping_cost = %updated.shipping_cost,
        discount_active = updated.discount_active,
        "settings updated"
    );

    Ok(Json(updated))
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.tax_rate < Decimal::ZERO || settings.tax_rate > Decimal::ONE {
        return Err(AppError::BadRequest(
            "tax rate must be between 0 and 1".to_owned(),
        ));
    }
    if settings.shipping_cost < Decimal::ZERO {
        return Err(AppError::BadRequest(
            "shipping cost cannot be negative".to_owned(),
        ));
    }
    if settings
        .free_shipping_threshold
        .is_some_and(|t| t < Decimal::ZERO)
    {
        return Err(AppError::BadRequest(
            "free shipping threshold cannot be negative".to_owned(),
        ));
    }
    if settings.discount_percent < Decimal::ZERO
        || settings.discount_percent > Decimal::ONE_HUNDRED
    {
        return Err(AppError::BadRequest(
            "discount percent must be between 0 and 100".to_owned(),
        ));
    }
    if settings.discount_active && settings.discount_code.trim().is_empty() {
        return Err(AppError::BadRequest(
            "an active discount needs a code".to_owned(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn settings() -> Settings {
        Settings {
            tax_rate: Decimal::new(8, 2),
            shipping_cost: Decimal::from(15),
            free_shipping_threshold: None,
            discount_code: "SAVE10".to_owned(),
            discount_percent: Decimal::from(10),
            discount_active: true,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&settings()).is_ok());
    }

    #[test]
    fn test_tax_rate_bounds() {
        let mut s = settings();
        s.tax_rate = Decimal::from(2);
        assert!(validate_settings(&s).is_err());
        s.tax_rate = Decimal::new(-1, 2);
        assert!(validate_settings(&s).is_err());
    }

    #[test]
    fn test_active_discount_requires_code() {
        let mut s = settings();
        s.discount_code = "  ".to_owned();
        assert!(validate_settings(&s).is_err());
        s.discount_active = false;
        assert!(validate_settings(&s).is_ok());
    }

    #[test]
    fn test_product_request_validation() {
        let request = ProductRequest {
            name: "Pearl Pendant".to_owned(),
            description: String::new(),
            price: Decimal::from(120),
            category_id: CategoryId::new(1),
            images: vec![String::new(); 5],
            stock: 10,
            low_stock_threshold: 5,
            featured: false,
        };
        // Five images exceeds the cap
        assert!(request.into_input().is_err());
    }

    #[test]
    fn test_product_request_rejects_free_products() {
        let request = ProductRequest {
            name: "Pearl Pendant".to_owned(),
            description: String::new(),
            price: Decimal::ZERO,
            category_id: CategoryId::new(1),
            images: vec![],
            stock: 10,
            low_stock_threshold: 5,
            featured: false,
        };
        assert!(request.into_input().is_err());
    }
}
