//! The order placement workflow.
//!
//! Checkout runs as a short pipeline: validate the payload, confirm the
//! user exists, resolve the discount, then (inside a single database
//! transaction) reserve stock for every line, price the order from the
//! server-side snapshots, and persist the order with its items. If any
//! line cannot be reserved the transaction rolls back, so no stock change
//! or partial order is ever observable. Totals are always recomputed here
//! from catalog prices and current settings; anything the client submits
//! about money is advisory only.

use rust_decimal::Decimal;
use sqlx::PgPool;

use aurelia_core::{PaymentMethod, ProductId, UserId};

use crate::db::orders::{NewOrder, NewOrderItem, insert_order};
use crate::db::products::{ReserveOutcome, reserve_stock};
use crate::db::{RepositoryError, SettingsRepository, UserRepository};
use crate::models::{OrderReceipt, ShippingAddress};
use crate::services::pricing::{self, PricedLine, PricingError};

/// Errors that can end a checkout attempt.
///
/// None of these leave any side effect behind: stock, orders, and the
/// cart are untouched on every failure path.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// Missing or malformed input (client error).
    #[error("invalid order payload: {0}")]
    InvalidPayload(String),

    /// The submitted user id does not resolve to an account.
    #[error("user not found")]
    UserNotFound,

    /// A line references a product id that does not exist.
    #[error("product {product_id} not found")]
    ProductNotFound { product_id: ProductId },

    /// A line requested more units than are available.
    #[error("insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        requested: i32,
        available: i32,
    },

    /// Settings or discount data failed validation (configuration corruption).
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The underlying store failed or the transaction aborted.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One requested line of a checkout.
#[derive(Debug, Clone)]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub size: Option<String>,
    pub length: Option<String>,
}

/// A checkout submission, after payload-level parsing.
///
/// `payment_method` is the raw client string; [`CheckoutService`] parses
/// it so an unknown method is a 400 like every other payload problem.
#[derive(Debug)]
pub struct PlaceOrderRequest {
    pub user_id: UserId,
    pub items: Vec<CheckoutItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub discount_code: Option<String>,
    pub notes: Option<String>,
}

/// Orchestrates order placement.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order: validate, reserve stock, price, persist.
    ///
    /// On success the order exists with status `pending` and every line's
    /// stock decremented. Clearing the shopper's cart is the caller's
    /// responsibility and must only happen after this returns `Ok`.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`]; no variant leaves partial state behind.
    pub async fn place_order(
        &self,
        request: &PlaceOrderRequest,
    ) -> Result<OrderReceipt, CheckoutError> {
        let payment_method = validate_request(request)?;

        let user = UserRepository::new(self.pool)
            .get_by_id(request.user_id)
            .await?
            .ok_or(CheckoutError::UserNotFound)?;

        let settings = SettingsRepository::new(self.pool).get().await?;

        let discount_percent = request
            .discount_code
            .as_deref()
            .and_then(|code| pricing::validate_discount_code(code, &settings))
            .unwrap_or(Decimal::ZERO);

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let mut snapshots = Vec::with_capacity(request.items.len());
        let mut priced = Vec::with_capacity(request.items.len());

        for item in &request.items {
            match reserve_stock(&mut tx, item.product_id, item.quantity).await? {
                ReserveOutcome::Reserved(line) => {
                    priced.push(PricedLine {
                        price: line.price,
                        quantity: item.quantity,
                    });
                    snapshots.push(NewOrderItem {
                        product_id: item.product_id,
                        name: line.name,
                        price: line.price,
                        quantity: item.quantity,
                        image: line.image,
                        size: item.size.clone(),
                        length: item.length.clone(),
                    });
                }
                // Dropping the transaction rolls back the decrements made
                // for earlier lines of this order.
                ReserveOutcome::NotFound => {
                    return Err(CheckoutError::ProductNotFound {
                        product_id: item.product_id,
                    });
                }
                ReserveOutcome::Insufficient { name, available } => {
                    return Err(CheckoutError::InsufficientStock {
                        product_id: item.product_id,
                        name,
                        requested: item.quantity,
                        available,
                    });
                }
            }
        }

        let totals = pricing::compute_totals(&priced, &settings, discount_percent)?;

        let receipt = insert_order(
            &mut tx,
            &NewOrder {
                user_id: user.id,
                subtotal: totals.subtotal,
                discount_amount: totals.discount_amount,
                shipping_cost: totals.shipping,
                tax_amount: totals.tax,
                total_amount: totals.total,
                shipping_address: request.shipping_address.clone(),
                payment_method,
                notes: request.notes.clone(),
                items: snapshots,
            },
        )
        .await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            order_number = %receipt.order_number,
            user_id = %user.id,
            total = %receipt.total_amount,
            lines = request.items.len(),
            "order placed"
        );

        Ok(receipt)
    }
}

/// Payload-level validation, before any I/O. Returns the parsed payment
/// method on success.
fn validate_request(request: &PlaceOrderRequest) -> Result<PaymentMethod, CheckoutError> {
    if request.items.is_empty() {
        return Err(CheckoutError::InvalidPayload("no items".to_owned()));
    }

    for item in &request.items {
        if item.quantity <= 0 {
            return Err(CheckoutError::InvalidPayload(format!(
                "quantity for product {} must be positive",
                item.product_id
            )));
        }
    }

    if !request.shipping_address.is_complete() {
        return Err(CheckoutError::InvalidPayload(
            "incomplete shipping address".to_owned(),
        ));
    }

    request
        .payment_method
        .parse::<PaymentMethod>()
        .map_err(CheckoutError::InvalidPayload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Mira Chen".to_owned(),
            email: "mira@example.com".to_owned(),
            phone: "555-0134".to_owned(),
            address: "7 Opal Way".to_owned(),
            city: "Austin".to_owned(),
            zip_code: "78701".to_owned(),
            country: "US".to_owned(),
        }
    }

    fn request(items: Vec<CheckoutItem>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            user_id: UserId::new(1),
            items,
            shipping_address: address(),
            payment_method: "card".to_owned(),
            discount_code: None,
            notes: None,
        }
    }

    fn item(product_id: i32, quantity: i32) -> CheckoutItem {
        CheckoutItem {
            product_id: ProductId::new(product_id),
            quantity,
            size: None,
            length: None,
        }
    }

    #[test]
    fn test_empty_items_rejected() {
        let result = validate_request(&request(vec![]));
        assert!(matches!(result, Err(CheckoutError::InvalidPayload(_))));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        for quantity in [0, -1] {
            let result = validate_request(&request(vec![item(1, quantity)]));
            assert!(matches!(result, Err(CheckoutError::InvalidPayload(_))));
        }
    }

    #[test]
    fn test_incomplete_address_rejected() {
        let mut req = request(vec![item(1, 2)]);
        req.shipping_address.zip_code = String::new();
        let result = validate_request(&req);
        assert!(matches!(result, Err(CheckoutError::InvalidPayload(_))));
    }

    #[test]
    fn test_unknown_payment_method_rejected() {
        let mut req = request(vec![item(1, 2)]);
        req.payment_method = "bank_transfer".to_owned();
        let result = validate_request(&req);
        assert!(matches!(result, Err(CheckoutError::InvalidPayload(_))));
    }

    #[test]
    fn test_valid_request_parses_payment_method() {
        let result = validate_request(&request(vec![item(1, 2), item(2, 1)]));
        assert!(matches!(result, Ok(PaymentMethod::Card)));
    }
}
