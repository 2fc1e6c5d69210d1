//! Product repository and the stock reservation primitive.
//!
//! Stock is the one hot piece of shared mutable state in the system. Every
//! checkout-path mutation goes through [`reserve_stock`], a single
//! conditional `UPDATE` whose `WHERE stock >= quantity` clause makes the
//! check-and-decrement linearizable: concurrent reservations for the same
//! product serialize on the row and the committed decrements can never
//! exceed the initial stock.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use aurelia_core::{CategoryId, ProductId};

use super::RepositoryError;
use crate::models::Product;

/// Internal row type for product queries (category name joined in).
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    category_id: i32,
    category_name: String,
    images: Vec<String>,
    stock: i32,
    low_stock_threshold: i32,
    featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            category_id: CategoryId::new(row.category_id),
            category_name: row.category_name,
            images: row.images,
            stock: row.stock,
            low_stock_threshold: row.low_stock_threshold,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_PRODUCT: &str = r"
    SELECT p.id, p.name, p.description, p.price, p.category_id,
           c.name AS category_name, p.images, p.stock, p.low_stock_threshold,
           p.featured, p.created_at, p.updated_at
    FROM products p
    JOIN categories c ON c.id = p.category_id
";

/// Fields for creating or replacing a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: CategoryId,
    pub images: Vec<String>,
    pub stock: i32,
    pub low_stock_threshold: i32,
    pub featured: bool,
}

/// Outcome of a stock reservation attempt for a single product.
#[derive(Debug)]
pub enum ReserveOutcome {
    /// Stock was decremented; carries the server-side snapshot data.
    Reserved(ReservedLine),
    /// No product with the requested id exists.
    NotFound,
    /// Not enough stock; `available` is the current count.
    Insufficient { name: String, available: i32 },
}

/// Server-side snapshot captured while reserving a line.
#[derive(Debug, Clone)]
pub struct ReservedLine {
    pub name: String,
    /// Catalog price at reservation time (the authoritative price).
    pub price: Decimal,
    pub image: String,
    /// Stock remaining after the decrement.
    pub stock_after: i32,
}

/// Atomically check and decrement stock for one product.
///
/// Runs on the caller's connection so it can participate in the checkout
/// transaction; if that transaction rolls back, the decrement is undone
/// with it. Losing a race to another order surfaces as
/// [`ReserveOutcome::Insufficient`] with the post-race available count.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn reserve_stock(
    conn: &mut PgConnection,
    product_id: ProductId,
    quantity: i32,
) -> Result<ReserveOutcome, RepositoryError> {
    #[derive(sqlx::FromRow)]
    struct DecrementRow {
        name: String,
        price: Decimal,
        images: Vec<String>,
        stock: i32,
    }

    let row = sqlx::query_as::<_, DecrementRow>(
        r"
        UPDATE products
        SET stock = stock - $2, updated_at = NOW()
        WHERE id = $1 AND stock >= $2
        RETURNING name, price, images, stock
        ",
    )
    .bind(product_id.as_i32())
    .bind(quantity)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(r) = row {
        return Ok(ReserveOutcome::Reserved(ReservedLine {
            name: r.name,
            price: r.price,
            image: r.images.first().cloned().unwrap_or_default(),
            stock_after: r.stock,
        }));
    }

    // The conditional update matched nothing: either the product does not
    // exist or it lacks stock. Distinguish the two for the caller.
    let current = sqlx::query_as::<_, (String, i32)>(
        "SELECT name, stock FROM products WHERE id = $1",
    )
    .bind(product_id.as_i32())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(match current {
        Some((name, available)) => ReserveOutcome::Insufficient { name, available },
        None => ReserveOutcome::NotFound,
    })
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.list_filtered(None, None).await
    }

    /// List products, optionally narrowed by category slug and featured flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_filtered(
        &self,
        category_slug: Option<&str>,
        featured: Option<bool>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"{SELECT_PRODUCT}
            WHERE ($1::TEXT IS NULL OR c.slug = $1)
              AND ($2::BOOL IS NULL OR p.featured = $2)
            ORDER BY p.created_at DESC"
        ))
        .bind(category_slug)
        .bind(featured)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// List all products ordered by stock ascending (for the stock screen).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_stock(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} ORDER BY p.stock ASC, p.id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} WHERE p.id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including
    /// an unknown category id).
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let id = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO products
                (name, description, price, category_id, images, stock,
                 low_stock_threshold, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.category_id.as_i32())
        .bind(&input.images)
        .bind(input.stock)
        .bind(input.low_stock_threshold)
        .bind(input.featured)
        .fetch_one(self.pool)
        .await?;

        self.get(ProductId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $2, description = $3, price = $4, category_id = $5,
                images = $6, stock = $7, low_stock_threshold = $8,
                featured = $9, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.category_id.as_i32())
        .bind(&input.images)
        .bind(input.stock)
        .bind(input.low_stock_threshold)
        .bind(input.featured)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// Returns `true` if a product was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is referenced by
    /// an order; `RepositoryError::Database` otherwise.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "product is referenced by existing orders".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Set a product's stock to an absolute value (admin stock edit).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    pub async fn set_stock(
        &self,
        id: ProductId,
        stock: i32,
        low_stock_threshold: Option<i32>,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET stock = $2,
                low_stock_threshold = COALESCE($3, low_stock_threshold),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(stock)
        .bind(low_stock_threshold)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }
}
