//! Order routes: placement, history, tracking, and invoices.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use aurelia_core::{OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId};

use crate::db::{CartRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Order, OrderItem, OrderReceipt, ShippingAddress};
use crate::services::checkout::{CheckoutItem, CheckoutService, PlaceOrderRequest};
use crate::state::AppState;

/// One line of an order placement request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub size: Option<String>,
    pub length: Option<String>,
}

/// Order placement request.
///
/// `paymentMethod` stays a plain string here; checkout validation parses
/// it and reports an unknown method as a 400 payload error rather than a
/// deserialization failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<CreateOrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub discount_code: Option<String>,
    pub notes: Option<String>,
}

/// An order line as served to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub image: String,
    pub size: Option<String>,
    pub length: Option<String>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
            image: item.image,
            size: item.size,
            length: item.length,
        }
    }
}

/// A full order as served to its owner (and to admins).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub order_number: String,
    pub items: Vec<OrderItemResponse>,
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

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            subtotal: order.subtotal,
            discount_amount: order.discount_amount,
            shipping_cost: order.shipping_cost,
            tax_amount: order.tax_amount,
            total_amount: order.total_amount,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            status: order.status,
            payment_status: order.payment_status,
            notes: order.notes,
            created_at: order.created_at,
        }
    }
}

/// Public tracking view of an order: progress only, no address or totals
/// beyond what the shopper already knows from the order number.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<TrackedItem>,
}

/// A tracking line: name and quantity only.
#[derive(Debug, Serialize)]
pub struct TrackedItem {
    pub name: String,
    pub quantity: i32,
}

/// Invoice view of an order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub order_number: String,
    pub issued_at: DateTime<Utc>,
    pub billed_to: ShippingAddress,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub shipping_cost: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
}

/// One invoice line with its extended total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

/// Place an order from the submitted items, then clear the cart.
///
/// POST /orders
///
/// Stock is checked and decremented atomically across all lines; on any
/// failure nothing is decremented, no order exists, and the cart is kept.
///
/// # Errors
///
/// Returns `AppError::Checkout` describing the first failing line.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderReceipt>)> {
    let place = PlaceOrderRequest {
        user_id,
        items: request
            .items
            .into_iter()
            .map(|item| CheckoutItem {
                product_id: item.product_id,
                quantity: item.quantity,
                size: item.size,
                length: item.length,
            })
            .collect(),
        shipping_address: request.shipping_address,
        payment_method: request.payment_method,
        discount_code: request.discount_code,
        notes: request.notes,
    };

    let receipt = CheckoutService::new(state.pool()).place_order(&place).await?;

    // The order is committed; a failed cart clear must not fail the request.
    if let Err(e) = CartRepository::new(state.pool()).clear(user_id).await {
        tracing::warn!(
            order_number = %receipt.order_number,
            error = %e,
            "cart clear after checkout failed"
        );
    }

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// List the current shopper's orders, newest first.
///
/// GET /orders
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = OrderRepository::new(state.pool()).list_by_user(user_id).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// Get one of the current shopper's orders.
///
/// GET /orders/{id}
///
/// Orders belonging to other shoppers are reported as not found.
///
/// # Errors
///
/// Returns `AppError::NotFound` for missing or foreign orders.
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>> {
    let order = owned_order(&state, user_id, id).await?;
    Ok(Json(OrderResponse::from(order)))
}

/// Track an order by its public order number.
///
/// GET /orders/track/{orderNumber}
///
/// Requires no login: the order number itself is the capability. Only
/// progress fields are returned.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no order has this number.
pub async fn track(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<TrackResponse>> {
    let order = OrderRepository::new(state.pool())
        .get_by_order_number(&order_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_number}")))?;

    Ok(Json(TrackResponse {
        order_number: order.order_number,
        status: order.status,
        payment_status: order.payment_status,
        created_at: order.created_at,
        items: order
            .items
            .into_iter()
            .map(|item| TrackedItem {
                name: item.name,
                quantity: item.quantity,
            })
            .collect(),
    }))
}

/// Get the invoice for one of the current shopper's orders.
///
/// GET /orders/{id}/invoice
///
/// # Errors
///
/// Returns `AppError::NotFound` for missing or foreign orders.
pub async fn invoice(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<InvoiceResponse>> {
    let order = owned_order(&state, user_id, id).await?;

    let lines = order
        .items
        .iter()
        .map(|item| InvoiceLine {
            name: item.name.clone(),
            unit_price: item.price,
            quantity: item.quantity,
            line_total: item.line_total(),
        })
        .collect();

    Ok(Json(InvoiceResponse {
        order_number: order.order_number,
        issued_at: order.created_at,
        billed_to: order.shipping_address,
        lines,
        subtotal: order.subtotal,
        discount_amount: order.discount_amount,
        shipping_cost: order.shipping_cost,
        tax_amount: order.tax_amount,
        total_amount: order.total_amount,
        payment_method: order.payment_method,
        payment_status: order.payment_status,
    }))
}

/// Fetch an order and verify it belongs to `user_id`.
async fn owned_order(state: &AppState, user_id: aurelia_core::UserId, id: OrderId) -> Result<Order> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .filter(|order| order.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(order)
}
