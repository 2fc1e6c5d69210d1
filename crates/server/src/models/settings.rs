//! Global store settings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The singleton settings record (tax, shipping, discount).
///
/// Exactly one row exists, created by migration with the store defaults and
/// updated wholesale by the admin. A slightly stale read during an update is
/// acceptable; settings are read-mostly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Tax rate as a fraction in `[0, 1]`.
    pub tax_rate: Decimal,
    /// Flat shipping cost per order.
    pub shipping_cost: Decimal,
    /// Orders with a discounted subtotal above this ship free. `None`
    /// disables free shipping.
    pub free_shipping_threshold: Option<Decimal>,
    /// The single global discount code (matched case-insensitively).
    pub discount_code: String,
    /// Discount as a percentage in `[0, 100]`.
    pub discount_percent: Decimal,
    pub discount_active: bool,
    #[serde(skip_deserializing, default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Settings {
    /// The public subset exposed to the storefront for checkout pricing.
    #[must_use]
    pub fn public_view(&self) -> PublicSettings {
        PublicSettings {
            tax_rate: self.tax_rate,
            shipping_cost: self.shipping_cost,
            free_shipping_threshold: self.free_shipping_threshold,
        }
    }
}

/// Read-only settings subset served to unauthenticated shoppers.
///
/// The discount code itself is never exposed here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSettings {
    pub tax_rate: Decimal,
    pub shipping_cost: Decimal,
    pub free_shipping_threshold: Option<Decimal>,
}
