//! Public category routes.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use aurelia_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::Result;
use crate::models::Category;
use crate::state::AppState;

/// A category as served to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            image: category.image,
            created_at: category.created_at,
        }
    }
}

/// List all categories.
///
/// GET /categories
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CategoryResponse>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;

    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}
