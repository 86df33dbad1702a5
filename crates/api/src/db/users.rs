//! User repository for database operations.

use sqlx::PgPool;

use casawood_core::{Email, Phone, UserId, UserRole};

use super::RepositoryError;
use crate::models::User;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by their (normalised) email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by their Google account id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE google_id = $1")
            .bind(google_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Create a user with a password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create_with_password(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        phone: Option<&Phone>,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (name, email, password_hash, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(phone.map(Phone::as_str))
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or_database(e, "email already exists"))
    }

    /// Create a user who signs in with Google only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or Google id is taken.
    pub async fn create_with_google(
        &self,
        name: &str,
        email: &Email,
        google_id: &str,
        avatar: Option<&str>,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (name, email, google_id, avatar)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(name)
        .bind(email)
        .bind(google_id)
        .bind(avatar)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or_database(e, "account already exists"))
    }

    /// Attach a Google id to an existing account, keeping any avatar it has.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn link_google(
        &self,
        id: UserId,
        google_id: &str,
        avatar: Option<&str>,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET google_id = $2, avatar = COALESCE(avatar, $3), updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(google_id)
        .bind(avatar)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or_database(e, "Google account already linked"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Update profile fields; `None` leaves a field unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        id: UserId,
        name: Option<&str>,
        phone: Option<&Phone>,
        avatar: Option<&str>,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                avatar = COALESCE($4, avatar),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(name)
        .bind(phone.map(Phone::as_str))
        .bind(avatar)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Create an admin, or promote an existing account and reset its password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_admin(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET role = EXCLUDED.role,
                password_hash = EXCLUDED.password_hash,
                updated_at = now()
            RETURNING *
            ",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(UserRole::Admin)
        .fetch_one(self.pool)
        .await?;
        Ok(user)
    }
}
