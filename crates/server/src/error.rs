//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Responses are JSON with a `message` field; insufficient-stock failures
//! additionally carry the product, requested, and available counts so the
//! client can adjust the cart.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order placement failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated (or lacks the admin role).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with current state (e.g. illegal status transition).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) => true,
            Self::Auth(err) => matches!(
                err,
                AuthError::Repository(_) | AuthError::PasswordHash
            ),
            Self::Checkout(err) => matches!(
                err,
                CheckoutError::Repository(_) | CheckoutError::Pricing(_)
            ),
            _ => false,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Checkout(err) => match err {
                CheckoutError::InvalidPayload(_) | CheckoutError::InsufficientStock { .. } => {
                    StatusCode::BAD_REQUEST
                }
                CheckoutError::UserNotFound | CheckoutError::ProductNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                CheckoutError::Pricing(_) | CheckoutError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn body(&self) -> serde_json::Value {
        // Don't expose internal error details to clients
        if self.is_server_error() {
            return json!({ "message": "Internal server error" });
        }

        match self {
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => json!({ "message": "Invalid credentials" }),
                AuthError::UserAlreadyExists => {
                    json!({ "message": "An account with this email already exists" })
                }
                AuthError::WeakPassword(msg) => json!({ "message": msg }),
                AuthError::InvalidEmail(_) => json!({ "message": "Invalid email address" }),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    json!({ "message": "Internal server error" })
                }
            },
            Self::Checkout(CheckoutError::InsufficientStock {
                product_id,
                name,
                requested,
                available,
            }) => json!({
                "message": format!("Insufficient stock for {name}"),
                "productId": product_id,
                "requested": requested,
                "available": available,
            }),
            other => json!({ "message": other.to_string() }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status_code(), Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurelia_core::ProductId;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_checkout_error_status_codes() {
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::InvalidPayload(
                "no items".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::ProductNotFound {
                product_id: ProductId::new(7),
            })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::InsufficientStock {
                product_id: ProductId::new(7),
                name: "Opal Ring".to_string(),
                requested: 3,
                available: 1,
            })),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_insufficient_stock_body_is_structured() {
        let err = AppError::Checkout(CheckoutError::InsufficientStock {
            product_id: ProductId::new(7),
            name: "Opal Ring".to_string(),
            requested: 3,
            available: 1,
        });

        let body = err.body();
        assert_eq!(body["productId"], 7);
        assert_eq!(body["requested"], 3);
        assert_eq!(body["available"], 1);
        assert_eq!(body["message"], "Insufficient stock for Opal Ring");
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = AppError::Internal("pool exhausted".to_string());
        assert_eq!(err.body()["message"], "Internal server error");
    }
}
