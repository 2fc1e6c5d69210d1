//! Discount code validation route.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::SettingsRepository;
use crate::error::Result;
use crate::services::pricing::validate_discount_code;
use crate::state::AppState;

/// Request to validate a discount code.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: String,
}

/// Result of a discount code validation.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    /// Discount percent, present only when `valid`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    pub message: String,
}

/// Validate a discount code against the store settings.
///
/// POST /discount
///
/// Matching is case-insensitive; an inactive discount never matches.
///
/// # Errors
///
/// Returns `AppError::Database` if the settings row cannot be read.
pub async fn validate(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>> {
    let settings = SettingsRepository::new(state.pool()).get().await?;

    let response = validate_discount_code(&request.code, &settings).map_or_else(
        || ValidateResponse {
            valid: false,
            discount: None,
            message: "Invalid discount code".to_owned(),
        },
        |percent| ValidateResponse {
            valid: true,
            discount: Some(percent),
            message: format!("Discount applied: {percent}% off"),
        },
    );

    Ok(Json(response))
}
