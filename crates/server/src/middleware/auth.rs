//! Authentication extractors backed by JWT cookies.
//!
//! Login issues a signed token in an HTTP-only cookie; the extractors here
//! verify it and make the authenticated identity available to handlers.
//! Shoppers and admins use separate cookies so an admin can stay logged in
//! to the back office while browsing the store.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use aurelia_core::{AdminId, UserId};

use crate::error::AppError;
use crate::state::AppState;

/// Cookie holding the shopper token.
pub const USER_COOKIE: &str = "auth_token";
/// Cookie holding the admin token.
pub const ADMIN_COOKIE: &str = "admin_token";

/// Token lifetime.
const TOKEN_TTL_DAYS: i64 = 7;

const ROLE_USER: &str = "user";
const ROLE_ADMIN: &str = "admin";

/// Claims stored in the auth token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Account id.
    sub: i32,
    /// Either `user` or `admin`.
    role: String,
    /// Expiration timestamp.
    exp: i64,
    /// Issued at timestamp.
    iat: i64,
}

fn issue_token(secret: &str, sub: i32, role: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub,
        role: role.to_owned(),
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token generation failed: {e}")))
}

fn verify_token(secret: &str, token: &str, expected_role: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized("invalid or expired token".to_owned()))?;

    if data.claims.role != expected_role {
        return Err(AppError::Unauthorized("wrong role for this resource".to_owned()));
    }

    Ok(data.claims)
}

fn auth_cookie(name: &'static str, token: String) -> Cookie<'static> {
    Cookie::build((name, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(TOKEN_TTL_DAYS))
        .build()
}

/// Build the shopper login cookie.
///
/// # Errors
///
/// Returns `AppError::Internal` if token signing fails.
pub fn issue_user_cookie(state: &AppState, user_id: UserId) -> Result<Cookie<'static>, AppError> {
    let secret = state.config().jwt_secret.expose_secret();
    let token = issue_token(secret, user_id.as_i32(), ROLE_USER)?;
    Ok(auth_cookie(USER_COOKIE, token))
}

/// Build the admin login cookie.
///
/// # Errors
///
/// Returns `AppError::Internal` if token signing fails.
pub fn issue_admin_cookie(state: &AppState, admin_id: AdminId) -> Result<Cookie<'static>, AppError> {
    let secret = state.config().jwt_secret.expose_secret();
    let token = issue_token(secret, admin_id.as_i32(), ROLE_ADMIN)?;
    Ok(auth_cookie(ADMIN_COOKIE, token))
}

/// Build an expired cookie that clears a login (logout).
#[must_use]
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build()
}

/// Extractor that requires a logged-in shopper.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(USER_COOKIE)
            .map(Cookie::value)
            .ok_or_else(|| AppError::Unauthorized("login required".to_owned()))?;

        let secret = state.config().jwt_secret.expose_secret();
        let claims = verify_token(secret, token, ROLE_USER)?;

        Ok(Self(UserId::new(claims.sub)))
    }
}

/// Extractor that requires a logged-in admin.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession(pub AdminId);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(ADMIN_COOKIE)
            .map(Cookie::value)
            .ok_or_else(|| AppError::Unauthorized("admin login required".to_owned()))?;

        let secret = state.config().jwt_secret.expose_secret();
        let claims = verify_token(secret, token, ROLE_ADMIN)?;

        Ok(Self(AdminId::new(claims.sub)))
    }
}
