//! Admin user management.
//!
//! Admins are ordinary accounts with the `admin` role. Creating an admin
//! for an email that already has an account promotes it and resets its
//! password.

use thiserror::Error;

use casawood_api::db::{self, RepositoryError, users::UserRepository};
use casawood_api::services::auth::{AuthError, hash_password, validate_password};
use casawood_core::{Email, UserId};

use super::{DATABASE_URL_VAR, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid name: must not be empty")]
    InvalidName,

    /// Password too weak or hashing failed.
    #[error(transparent)]
    Password(#[from] AuthError),
}

/// Create an admin user, or promote the existing account with this email.
///
/// # Errors
///
/// Returns `AdminError` on invalid input or database failure.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<UserId, AdminError> {
    let email = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AdminError::InvalidName);
    }
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let database_url = database_url().ok_or(AdminError::MissingEnvVar(DATABASE_URL_VAR))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let user = UserRepository::new(&pool)
        .upsert_admin(name, &email, &password_hash)
        .await?;

    tracing::info!(
        "Admin user ready! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(user.id)
}
