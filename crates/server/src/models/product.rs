//! Product and category domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use aurelia_core::{CategoryId, ProductId};

/// A catalog product.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    pub category_id: CategoryId,
    /// Name of the referenced category, joined in by the repository.
    pub category_name: String,
    /// Ordered image URLs, at most [`Self::MAX_IMAGES`].
    pub images: Vec<String>,
    pub stock: i32,
    pub low_stock_threshold: i32,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Maximum number of images per product.
    pub const MAX_IMAGES: usize = 4;

    /// Whether the product is purchasable.
    ///
    /// Derived from `stock` rather than stored, so it can never drift out
    /// of sync with the stock count.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether the stock has fallen to or below the low-stock threshold.
    #[must_use]
    pub const fn low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }
}

/// A product category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// URL-safe unique slug.
    pub slug: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurelia_core::{CategoryId, ProductId};

    fn product(stock: i32, threshold: i32) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Gold Ring".to_owned(),
            description: String::new(),
            price: Decimal::new(19999, 2),
            category_id: CategoryId::new(1),
            category_name: "Rings".to_owned(),
            images: vec![],
            stock,
            low_stock_threshold: threshold,
            featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_in_stock_derived_from_stock() {
        assert!(product(1, 5).in_stock());
        assert!(!product(0, 5).in_stock());
    }

    #[test]
    fn test_low_stock_flag() {
        assert!(product(5, 5).low_stock());
        assert!(product(0, 5).low_stock());
        assert!(!product(6, 5).low_stock());
    }
}
