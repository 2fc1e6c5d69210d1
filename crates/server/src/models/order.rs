//! Order domain types.
//!
//! Item names and prices are snapshots taken at order creation; later
//! catalog edits never change a historical order. After creation only
//! `status` and `payment_status` may change.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use aurelia_core::{OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId};

/// A placed order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    /// Human-readable unique order number (e.g. `ORD-000042`), used for
    /// public tracking lookups.
    pub order_number: String,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub shipping_cost: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A single line of an order, snapshotted from the product at creation.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub image: String,
    pub size: Option<String>,
    pub length: Option<String>,
}

impl OrderItem {
    /// Line total (price × quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Shipping address captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Whether every field is non-blank.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        ![
            &self.name,
            &self.email,
            &self.phone,
            &self.address,
            &self.city,
            &self.zip_code,
            &self.country,
        ]
        .iter()
        .any(|field| field.trim().is_empty())
    }
}

/// The caller-facing summary returned when an order is created.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Asha Rao".to_owned(),
            email: "asha@example.com".to_owned(),
            phone: "555-0100".to_owned(),
            address: "12 Pearl St".to_owned(),
            city: "Jaipur".to_owned(),
            zip_code: "302001".to_owned(),
            country: "IN".to_owned(),
        }
    }

    #[test]
    fn test_complete_address() {
        assert!(address().is_complete());
    }

    #[test]
    fn test_blank_field_is_incomplete() {
        let mut addr = address();
        addr.city = "   ".to_owned();
        assert!(!addr.is_complete());
    }

    #[test]
    fn test_line_total() {
        let item = OrderItem {
            id: OrderItemId::new(1),
            product_id: ProductId::new(1),
            name: "Silver Chain".to_owned(),
            price: Decimal::new(4950, 2),
            quantity: 3,
            image: String::new(),
            size: None,
            length: Some("18in".to_owned()),
        };
        assert_eq!(item.line_total(), Decimal::new(14850, 2));
    }
}
