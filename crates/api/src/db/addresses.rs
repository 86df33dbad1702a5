//! Address book repository.
//!
//! Every query is scoped by owner, so another user's address id behaves
//! exactly like one that does not exist.

use sqlx::{PgPool, Postgres, Transaction};

use casawood_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::{Address, NewAddress};

/// Repository for user addresses.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's addresses, default first, then newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(
            r"
            SELECT * FROM addresses
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(addresses)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            "SELECT * FROM addresses WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(address)
    }

    /// Add an address. The user's first address always becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        new: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        let make_default = new.is_default || existing == 0;
        if make_default {
            clear_default(&mut tx, user_id).await?;
        }

        let address = sqlx::query_as::<_, Address>(
            r"
            INSERT INTO addresses (
                user_id, full_name, phone, line1, line2, city, state, pincode,
                country, address_type, is_default
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(&new.full_name)
        .bind(&new.phone)
        .bind(&new.line1)
        .bind(&new.line2)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.pincode)
        .bind(&new.country)
        .bind(new.address_type)
        .bind(make_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(address)
    }

    /// Replace an address's fields. A default address stays default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address isn't the user's.
    pub async fn update(
        &self,
        user_id: UserId,
        id: AddressId,
        new: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if new.is_default {
            clear_default_except(&mut tx, user_id, id).await?;
        }

        let address = sqlx::query_as::<_, Address>(
            r"
            UPDATE addresses SET
                full_name = $3, phone = $4, line1 = $5, line2 = $6, city = $7,
                state = $8, pincode = $9, country = $10, address_type = $11,
                is_default = is_default OR $12,
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            ",
        )
        .bind(id)
        .bind(user_id)
        .bind(&new.full_name)
        .bind(&new.phone)
        .bind(&new.line1)
        .bind(&new.line2)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.pincode)
        .bind(&new.country)
        .bind(new.address_type)
        .bind(new.is_default)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(address)
    }

    /// Delete an address. If it was the default, the most recently added
    /// remaining address becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address isn't the user's.
    pub async fn delete(&self, user_id: UserId, id: AddressId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let was_default: bool = sqlx::query_scalar(
            "DELETE FROM addresses WHERE id = $1 AND user_id = $2 RETURNING is_default",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if was_default {
            sqlx::query(
                r"
                UPDATE addresses SET is_default = TRUE, updated_at = now()
                WHERE id = (
                    SELECT id FROM addresses
                    WHERE user_id = $1
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                )
                ",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Make `id` the user's only default address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address isn't the user's.
    pub async fn set_default(
        &self,
        user_id: UserId,
        id: AddressId,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        clear_default_except(&mut tx, user_id, id).await?;
        let address = sqlx::query_as::<_, Address>(
            r"
            UPDATE addresses SET is_default = TRUE, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(address)
    }
}

async fn clear_default(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND is_default")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn clear_default_except(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    keep: AddressId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND is_default AND id <> $2",
    )
    .bind(user_id)
    .bind(keep)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
