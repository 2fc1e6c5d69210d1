//! Shopper authentication routes.
//!
//! Login and registration set an HTTP-only JWT cookie; logout clears it.

use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aurelia_core::UserId;

use crate::db::UserRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::{CurrentUser, USER_COOKIE, issue_user_cookie, removal_cookie};
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// A shopper account as served to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email.into_inner(),
            phone: user.phone,
            created_at: user.created_at,
        }
    }
}

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register a new shopper and log them in.
///
/// POST /auth/register
///
/// # Errors
///
/// Returns `AppError::Auth` on validation failure or duplicate email.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(CookieJar, Json<UserResponse>)> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }

    let user = AuthService::new(state.pool())
        .register(
            request.name.trim(),
            &request.email,
            &request.password,
            request.phone.as_deref(),
        )
        .await?;

    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "user registered");

    let cookie = issue_user_cookie(&state, user.id)?;
    Ok((jar.add(cookie), Json(UserResponse::from(user))))
}

/// Login with email and password.
///
/// POST /auth/login
///
/// # Errors
///
/// Returns `AppError::Auth` if the credentials are wrong.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>)> {
    let user = AuthService::new(state.pool())
        .login(&request.email, &request.password)
        .await?;

    set_sentry_user(&user.id, Some(user.email.as_str()));

    let cookie = issue_user_cookie(&state, user.id)?;
    Ok((jar.add(cookie), Json(UserResponse::from(user))))
}

/// Clear the login cookie.
///
/// POST /auth/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    clear_sentry_user();
    (
        jar.add(removal_cookie(USER_COOKIE)),
        Json(serde_json::json!({ "message": "logged out" })),
    )
}

/// Get the currently logged-in shopper.
///
/// GET /auth/me
///
/// # Errors
///
/// Returns `AppError::Unauthorized` without a valid cookie and
/// `AppError::NotFound` if the account no longer exists.
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserResponse>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_owned()))?;

    Ok(Json(UserResponse::from(user)))
}
