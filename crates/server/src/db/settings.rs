//! Settings repository.
//!
//! The settings table holds exactly one row at the fixed key `id = 1`,
//! created by migration. Reads and writes always address that key, so no
//! find-or-create race exists.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Settings;

/// Internal row type for the settings singleton.
#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    tax_rate: Decimal,
    shipping_cost: Decimal,
    free_shipping_threshold: Option<Decimal>,
    discount_code: String,
    discount_percent: Decimal,
    discount_active: bool,
    updated_at: DateTime<Utc>,
}

impl From<SettingsRow> for Settings {
    fn from(row: SettingsRow) -> Self {
        Self {
            tax_rate: row.tax_rate,
            shipping_cost: row.shipping_cost,
            free_shipping_threshold: row.free_shipping_threshold,
            discount_code: row.discount_code,
            discount_percent: row.discount_percent,
            discount_active: row.discount_active,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for the settings singleton.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Read the settings record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the seeded row is
    /// missing (migrations not run), or `Database` if the query fails.
    pub async fn get(&self) -> Result<Settings, RepositoryError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r"
            SELECT tax_rate, shipping_cost, free_shipping_threshold,
                   discount_code, discount_percent, discount_active, updated_at
            FROM settings
            WHERE id = 1
            ",
        )
        .fetch_optional(self.pool)
        .await?;

        row.map(Settings::from).ok_or_else(|| {
            RepositoryError::DataCorruption("settings row missing; run migrations".to_owned())
        })
    }

    /// Replace the settings record wholesale (admin update).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails, including
    /// when a value violates a range constraint.
    pub async fn update(&self, settings: &Settings) -> Result<Settings, RepositoryError> {
        sqlx::query(
            r"
            UPDATE settings
            SET tax_rate = $1, shipping_cost = $2, free_shipping_threshold = $3,
                discount_code = $4, discount_percent = $5, discount_active = $6,
                updated_at = NOW()
            WHERE id = 1
            ",
        )
        .bind(settings.tax_rate)
        .bind(settings.shipping_cost)
        .bind(settings.free_shipping_threshold)
        .bind(&settings.discount_code)
        .bind(settings.discount_percent)
        .bind(settings.discount_active)
        .execute(self.pool)
        .await?;

        self.get().await
    }
}
