//! Public catalog routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use aurelia_core::{CategoryId, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// A product as served to clients.
///
/// `in_stock` and `low_stock` are derived from the stock count at
/// serialization time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    pub category: String,
    pub images: Vec<String>,
    pub stock: i32,
    pub low_stock_threshold: i32,
    pub in_stock: bool,
    pub low_stock: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            in_stock: product.in_stock(),
            low_stock: product.low_stock(),
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            category_id: product.category_id,
            category: product.category_name,
            images: product.images,
            stock: product.stock,
            low_stock_threshold: product.low_stock_threshold,
            featured: product.featured,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Query filters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Category slug to narrow by.
    pub category: Option<String>,
    pub featured: Option<bool>,
}

/// List products.
///
/// GET /products?category={slug}&featured={bool}
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductResponse>>> {
    let products = ProductRepository::new(state.pool())
        .list_filtered(query.category.as_deref(), query.featured)
        .await?;

    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// Get one product.
///
/// GET /products/{id}
///
/// # Errors
///
/// Returns `AppError::NotFound` if no product has this id.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductResponse>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(ProductResponse::from(product)))
}
