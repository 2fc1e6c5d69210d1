//! Order repository.
//!
//! Orders are insert-only snapshots: after [`insert_order`] commits, only
//! `status` and `payment_status` ever change, via [`OrderRepository::set_status`].

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use aurelia_core::{
    OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId,
};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderReceipt, ShippingAddress};

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    user_id: i32,
    subtotal: Decimal,
    discount_amount: Decimal,
    shipping_cost: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    ship_name: String,
    ship_email: String,
    ship_phone: String,
    ship_address: String,
    ship_city: String,
    ship_zip_code: String,
    ship_country: String,
    payment_method: String,
    status: String,
    payment_status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let status = OrderStatus::from_str(&self.status)
            .map_err(RepositoryError::DataCorruption)?;
        let payment_status = PaymentStatus::from_str(&self.payment_status)
            .map_err(RepositoryError::DataCorruption)?;
        let payment_method = PaymentMethod::from_str(&self.payment_method)
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Order {
            id: OrderId::new(self.id),
            order_number: self.order_number,
            user_id: UserId::new(self.user_id),
            items,
            subtotal: self.subtotal,
            discount_amount: self.discount_amount,
            shipping_cost: self.shipping_cost,
            tax_amount: self.tax_amount,
            total_amount: self.total_amount,
            shipping_address: ShippingAddress {
                name: self.ship_name,
                email: self.ship_email,
                phone: self.ship_phone,
                address: self.ship_address,
                city: self.ship_city,
                zip_code: self.ship_zip_code,
                country: self.ship_country,
            },
            payment_method,
            status,
            payment_status,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

/// Internal row type for order item queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    name: String,
    price: Decimal,
    quantity: i32,
    image: String,
    size: Option<String>,
    length: Option<String>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            name: row.name,
            price: row.price,
            quantity: row.quantity,
            image: row.image,
            size: row.size,
            length: row.length,
        }
    }
}

const SELECT_ORDER: &str = r"
    SELECT id, order_number, user_id, subtotal, discount_amount,
           shipping_cost, tax_amount, total_amount, ship_name, ship_email,
           ship_phone, ship_address, ship_city, ship_zip_code, ship_country,
           payment_method, status, payment_status, notes, created_at
    FROM orders
";

/// All fields needed to persist a new order with its item snapshots.
#[derive(Debug)]
pub struct NewOrder {
    pub user_id: UserId,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub shipping_cost: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// A single snapshotted order line to persist.
#[derive(Debug)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub image: String,
    pub size: Option<String>,
    pub length: Option<String>,
}

/// Insert an order and its items on the caller's connection.
///
/// Runs inside the checkout transaction so the order row commits or aborts
/// together with the stock decrements. The order number is assigned by the
/// database sequence.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if an insert fails.
pub async fn insert_order(
    conn: &mut PgConnection,
    order: &NewOrder,
) -> Result<OrderReceipt, RepositoryError> {
    #[derive(sqlx::FromRow)]
    struct InsertedRow {
        id: i32,
        order_number: String,
        status: String,
        created_at: DateTime<Utc>,
    }

    let inserted = sqlx::query_as::<_, InsertedRow>(
        r"
        INSERT INTO orders
            (user_id, subtotal, discount_amount, shipping_cost, tax_amount,
             total_amount, ship_name, ship_email, ship_phone, ship_address,
             ship_city, ship_zip_code, ship_country, payment_method, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING id, order_number, status, created_at
        ",
    )
    .bind(order.user_id.as_i32())
    .bind(order.subtotal)
    .bind(order.discount_amount)
    .bind(order.shipping_cost)
    .bind(order.tax_amount)
    .bind(order.total_amount)
    .bind(&order.shipping_address.name)
    .bind(&order.shipping_address.email)
    .bind(&order.shipping_address.phone)
    .bind(&order.shipping_address.address)
    .bind(&order.shipping_address.city)
    .bind(&order.shipping_address.zip_code)
    .bind(&order.shipping_address.country)
    .bind(order.payment_method.to_string())
    .bind(order.notes.as_deref())
    .fetch_one(&mut *conn)
    .await?;

    for item in &order.items {
        sqlx::query(
            r"
            INSERT INTO order_items
                (order_id, product_id, name, price, quantity, image, size, length)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(inserted.id)
        .bind(item.product_id.as_i32())
        .bind(&item.name)
        .bind(item.price)
        .bind(item.quantity)
        .bind(&item.image)
        .bind(item.size.as_deref())
        .bind(item.length.as_deref())
        .execute(&mut *conn)
        .await?;
    }

    let status = OrderStatus::from_str(&inserted.status)
        .map_err(RepositoryError::DataCorruption)?;

    Ok(OrderReceipt {
        order_id: OrderId::new(inserted.id),
        order_number: inserted.order_number,
        status,
        total_amount: order.total_amount,
        created_at: inserted.created_at,
    })
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by id, with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(row) => {
                let items = self.items_for(&[row.id]).await?.remove(&row.id).unwrap_or_default();
                Ok(Some(row.into_order(items)?))
            }
            None => Ok(None),
        }
    }

    /// Get an order by its public order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row =
            sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} WHERE order_number = $1"))
                .bind(order_number)
                .fetch_optional(self.pool)
                .await?;

        match row {
            Some(row) => {
                let items = self.items_for(&[row.id]).await?.remove(&row.id).unwrap_or_default();
                Ok(Some(row.into_order(items)?))
            }
            None => Ok(None),
        }
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// List all orders, newest first (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Read the current status pair of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` if a stored status string is unknown.
    pub async fn get_status(
        &self,
        id: OrderId,
    ) -> Result<Option<(OrderStatus, PaymentStatus)>, RepositoryError> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT status, payment_status FROM orders WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some((status, payment_status)) => Ok(Some((
                OrderStatus::from_str(&status).map_err(RepositoryError::DataCorruption)?,
                PaymentStatus::from_str(&payment_status)
                    .map_err(RepositoryError::DataCorruption)?,
            ))),
            None => Ok(None),
        }
    }

    /// Move an order's status pair from an expected current value to a
    /// new one, as a single conditional update.
    ///
    /// Transition legality is the caller's responsibility; the `WHERE`
    /// guard only ensures the caller's view is still current, so two
    /// racing updates cannot both commit against the same state. Returns
    /// `false` when the row no longer matches (lost race or missing
    /// order) and nothing was written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        from_status: OrderStatus,
        from_payment: PaymentStatus,
        status: OrderStatus,
        payment_status: PaymentStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $2, payment_status = $3 \
             WHERE id = $1 AND status = $4 AND payment_status = $5",
        )
        .bind(id.as_i32())
        .bind(status.to_string())
        .bind(payment_status.to_string())
        .bind(from_status.to_string())
        .bind(from_payment.to_string())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Attach items to a batch of order rows.
    async fn assemble(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut items = self.items_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect()
    }

    /// Load items for a set of orders in one query.
    async fn items_for(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<OrderItem>>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_id, name, price, quantity, image, size, length
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            by_order.entry(row.order_id).or_default().push(OrderItem::from(row));
        }

        Ok(by_order)
    }
}
