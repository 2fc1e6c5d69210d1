//! Admin account management.
//!
//! There is no self-service admin signup; the back-office account is
//! provisioned here. Running `create` for an existing email resets its
//! password, which doubles as the recovery path.

use aurelia_core::Email;
use aurelia_server::db::AdminRepository;
use aurelia_server::services::auth::hash_password;

use super::{CliError, connect};

/// Minimum admin password length, matching the server's rule.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Create the admin account, or reset its password if the email exists.
///
/// # Errors
///
/// Returns `CliError::InvalidInput` for a bad email or short password.
pub async fn create(email: &str, password: &str) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|e| CliError::InvalidInput(format!("{e}")))?;

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(CliError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let password_hash = hash_password(password)
        .map_err(|e| CliError::InvalidInput(format!("password hashing failed: {e}")))?;

    let pool = connect().await?;

    let admin = AdminRepository::new(&pool)
        .upsert(&email, &password_hash)
        .await
        .map_err(|e| CliError::InvalidInput(e.to_string()))?;

    tracing::info!("Admin account ready! ID: {}, Email: {}", admin.id, admin.email);
    Ok(())
}
