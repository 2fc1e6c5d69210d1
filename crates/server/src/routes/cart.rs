//! Cart routes.
//!
//! The cart is a scratch list; stock and prices are only enforced at
//! checkout, but quantities must be positive on entry. Adding a product
//! already in the cart increments its quantity. DELETE without a
//! `productId` clears the whole cart.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use aurelia_core::ProductId;

use crate::db::CartRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::CartItem;
use crate::state::AppState;

/// Quantity update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Target of a cart DELETE; absent `productId` means clear everything.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveQuery {
    pub product_id: Option<ProductId>,
}

/// List the current shopper's cart.
///
/// GET /cart
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<CartItem>>> {
    let items = CartRepository::new(state.pool()).list(user_id).await?;
    Ok(Json(items))
}

/// Add an item to the cart (incrementing if already present) and return
/// the updated cart.
///
/// POST /cart
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a non-positive quantity and
/// `AppError::Database` if the upsert fails.
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(item): Json<CartItem>,
) -> Result<Json<Vec<CartItem>>> {
    validate_new_item(&item)?;
    let repo = CartRepository::new(state.pool());
    repo.add(user_id, &item).await?;
    Ok(Json(repo.list(user_id).await?))
}

/// The `cart_items` table enforces `quantity > 0`; reject bad input here
/// so the client sees a 400 instead of a constraint violation.
fn validate_new_item(item: &CartItem) -> Result<()> {
    if item.quantity <= 0 {
        return Err(AppError::BadRequest(format!(
            "quantity must be positive (got {})",
            item.quantity
        )));
    }
    Ok(())
}

/// Set a line's quantity (zero or below removes it) and return the
/// updated cart.
///
/// PUT /cart
///
/// # Errors
///
/// Returns `AppError::Database` if the update fails.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<Vec<CartItem>>> {
    let repo = CartRepository::new(state.pool());
    repo.set_quantity(user_id, request.product_id, request.quantity)
        .await?;
    Ok(Json(repo.list(user_id).await?))
}

/// Remove one line, or clear the cart when no `productId` is given, and
/// return the updated cart.
///
/// DELETE /cart?productId={id}
///
/// # Errors
///
/// Returns `AppError::Database` if the delete fails.
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<RemoveQuery>,
) -> Result<Json<Vec<CartItem>>> {
    let repo = CartRepository::new(state.pool());
    match query.product_id {
        Some(product_id) => repo.remove(user_id, product_id).await?,
        None => repo.clear(user_id).await?,
    }
    Ok(Json(repo.list(user_id).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn item_with_quantity(quantity: i32) -> CartItem {
        CartItem {
            product_id: ProductId::from(1),
            name: "Gold Hoop Earrings".to_string(),
            price: Decimal::new(12900, 2),
            image: "/images/hoops.jpg".to_string(),
            quantity,
            category: "earrings".to_string(),
            size: None,
            length: None,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_positive_quantity_accepted() {
        assert!(validate_new_item(&item_with_quantity(1)).is_ok());
        assert!(validate_new_item(&item_with_quantity(12)).is_ok());
    }

    #[test]
    fn test_zero_quantity_rejected_as_bad_request() {
        let err = validate_new_item(&item_with_quantity(0)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_negative_quantity_rejected_as_bad_request() {
        let err = validate_new_item(&item_with_quantity(-3)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
