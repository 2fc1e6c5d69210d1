//! Public settings route.

use axum::{Json, extract::State};

use crate::db::SettingsRepository;
use crate::error::Result;
use crate::models::PublicSettings;
use crate::state::AppState;

/// Get the public pricing settings (tax rate, shipping, free-shipping
/// threshold). The discount code is never included here.
///
/// GET /settings
///
/// # Errors
///
/// Returns `AppError::Database` if the settings row cannot be read.
pub async fn show(State(state): State<AppState>) -> Result<Json<PublicSettings>> {
    let settings = SettingsRepository::new(state.pool()).get().await?;
    Ok(Json(settings.public_view()))
}
