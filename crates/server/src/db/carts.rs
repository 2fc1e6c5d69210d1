//! Cart and wishlist repositories.
//!
//! Simple keyed-list CRUD: one row per (user, product). Adding an existing
//! cart product increments its quantity; adding an existing wishlist
//! product is a no-op.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use aurelia_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::{CartItem, WishlistItem};

/// Internal row type for cart items.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    product_id: i32,
    name: String,
    price: Decimal,
    image: String,
    quantity: i32,
    category: String,
    size: Option<String>,
    length: Option<String>,
    added_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            name: row.name,
            price: row.price,
            image: row.image,
            quantity: row.quantity,
            category: row.category,
            size: row.size,
            length: row.length,
            added_at: row.added_at,
        }
    }
}

/// Internal row type for wishlist items.
#[derive(Debug, sqlx::FromRow)]
struct WishlistItemRow {
    product_id: i32,
    name: String,
    price: Decimal,
    image: String,
    category: String,
    added_at: DateTime<Utc>,
}

impl From<WishlistItemRow> for WishlistItem {
    fn from(row: WishlistItemRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            name: row.name,
            price: row.price,
            image: row.image,
            category: row.category,
            added_at: row.added_at,
        }
    }
}

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's cart in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT product_id, name, price, image, quantity, category, size, length, added_at
            FROM cart_items
            WHERE user_id = $1
            ORDER BY added_at, product_id
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    /// Add an item, incrementing quantity if the product is already present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add(&self, user_id: UserId, item: &CartItem) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart_items
                (user_id, product_id, name, price, image, quantity, category, size, length)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            ",
        )
        .bind(user_id.as_i32())
        .bind(item.product_id.as_i32())
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.image)
        .bind(item.quantity)
        .bind(&item.category)
        .bind(item.size.as_deref())
        .bind(item.length.as_deref())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Set a line's quantity; zero or below removes the line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        if quantity <= 0 {
            self.remove(user_id, product_id).await?;
            return Ok(());
        }

        sqlx::query(
            "UPDATE cart_items SET quantity = $3 WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id.as_i32())
            .bind(product_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Remove every line in a user's cart (after a successful checkout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

/// Repository for wishlist operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's wishlist in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistItemRow>(
            r"
            SELECT product_id, name, price, image, category, added_at
            FROM wishlist_items
            WHERE user_id = $1
            ORDER BY added_at, product_id
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(WishlistItem::from).collect())
    }

    /// Add an item; already-present products are left as-is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add(&self, user_id: UserId, item: &WishlistItem) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO wishlist_items (user_id, product_id, name, price, image, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, product_id) DO NOTHING
            ",
        )
        .bind(user_id.as_i32())
        .bind(item.product_id.as_i32())
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.image)
        .bind(&item.category)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove one entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id.as_i32())
            .bind(product_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
