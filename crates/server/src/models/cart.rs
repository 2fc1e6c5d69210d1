//! Cart and wishlist line items.
//!
//! Both are per-user keyed lists over product IDs. The cart carries a
//! quantity; the wishlist does not. A successful checkout clears the cart
//! but leaves the wishlist untouched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use aurelia_core::ProductId;

/// A cart line for one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub quantity: i32,
    pub category: String,
    pub size: Option<String>,
    pub length: Option<String>,
    #[serde(skip_deserializing, default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

/// A wishlist entry for one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub category: String,
    #[serde(skip_deserializing, default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}
