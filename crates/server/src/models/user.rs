//! User and admin account domain types.

use chrono::{DateTime, Utc};

use aurelia_core::{AdminId, Email, UserId};

/// A registered shopper.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The back-office admin account.
#[derive(Debug, Clone)]
pub struct Admin {
    pub id: AdminId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}
