//! Wishlist routes.

use axum::{
    Json,
    extract::{Path, State},
};

use aurelia_core::ProductId;

use crate::db::WishlistRepository;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::WishlistItem;
use crate::state::AppState;

/// List the current shopper's wishlist.
///
/// GET /wishlist
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<WishlistItem>>> {
    let items = WishlistRepository::new(state.pool()).list(user_id).await?;
    Ok(Json(items))
}

/// Add an item to the wishlist; adding an item already present is a no-op.
///
/// POST /wishlist
///
/// # Errors
///
/// Returns `AppError::Database` if the insert fails.
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(item): Json<WishlistItem>,
) -> Result<Json<Vec<WishlistItem>>> {
    let repo = WishlistRepository::new(state.pool());
    repo.add(user_id, &item).await?;
    Ok(Json(repo.list(user_id).await?))
}

/// Remove one wishlist entry.
///
/// DELETE /wishlist/{productId}
///
/// # Errors
///
/// Returns `AppError::Database` if the delete fails.
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<WishlistItem>>> {
    let repo = WishlistRepository::new(state.pool());
    repo.remove(user_id, product_id).await?;
    Ok(Json(repo.list(user_id).await?))
}
