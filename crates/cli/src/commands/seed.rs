//! Reference data seeding.

use super::{CliError, connect};

/// The store's default category set.
const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    ("NECKLACES", "necklaces", "/nacklace1.webp"),
    ("RINGS", "rings", "/ring1.webp"),
    ("EARRINGS", "earrings", "/earring1.jpeg"),
    ("BANGLES", "bangles", "/bracelet3.webp"),
    ("BRACELETS", "bracelets", "/bracelet3.webp"),
];

/// Seed the default jewelry categories.
///
/// Idempotent: categories whose slug already exists are left untouched.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or an insert fails.
pub async fn categories() -> Result<(), CliError> {
    let pool = connect().await?;

    for (name, slug, image) in DEFAULT_CATEGORIES {
        let result = sqlx::query(
            r"
            INSERT INTO categories (name, slug, image)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO NOTHING
            ",
        )
        .bind(name)
        .bind(slug)
        .bind(image)
        .execute(&pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!("Seeded category: {name}");
        } else {
            tracing::info!("Category already present: {name}");
        }
    }

    tracing::info!("Category seeding complete!");
    Ok(())
}
