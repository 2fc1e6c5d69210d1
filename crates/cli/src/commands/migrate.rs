//! Database migration command.
//!
//! Migrations live in `crates/server/migrations/` and are embedded into
//! this binary at compile time; the server never runs them on startup.

use super::{CliError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
