//! Fabric and category repositories.

use sqlx::PgPool;

use casawood_core::FabricId;

use super::RepositoryError;
use crate::models::{Category, Fabric, NewCategory, NewFabric, slugify};

/// Repository for upholstery fabrics.
pub struct FabricRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FabricRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List fabrics, optionally by type and stock state, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        fabric_type: Option<&str>,
        in_stock: Option<bool>,
    ) -> Result<Vec<Fabric>, RepositoryError> {
        let fabrics = sqlx::query_as::<_, Fabric>(
            r"
            SELECT * FROM fabrics
            WHERE ($1::text IS NULL OR lower(fabric_type) = lower($1))
              AND ($2::boolean IS NULL OR in_stock = $2)
            ORDER BY name
            ",
        )
        .bind(fabric_type)
        .bind(in_stock)
        .fetch_all(self.pool)
        .await?;
        Ok(fabrics)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: FabricId) -> Result<Option<Fabric>, RepositoryError> {
        let fabric = sqlx::query_as::<_, Fabric>("SELECT * FROM fabrics WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(fabric)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(&self, new: &NewFabric) -> Result<Fabric, RepositoryError> {
        self.insert(new, false)
            .await
            .map_err(|e| match e {
                RepositoryError::Database(db) => {
                    RepositoryError::unique_or_database(db, "a fabric with this name already exists")
                }
                other => other,
            })
    }

    /// Insert or replace the fabric with the same name. Used by seeding.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_name(&self, new: &NewFabric) -> Result<Fabric, RepositoryError> {
        self.insert(new, true).await
    }

    async fn insert(&self, new: &NewFabric, upsert: bool) -> Result<Fabric, RepositoryError> {
        let conflict = if upsert {
            r"
            ON CONFLICT (name) DO UPDATE SET
                fabric_type = EXCLUDED.fabric_type,
                color = EXCLUDED.color,
                color_hex = EXCLUDED.color_hex,
                image = EXCLUDED.image,
                price_modifier = EXCLUDED.price_modifier,
                in_stock = EXCLUDED.in_stock
            "
        } else {
            ""
        };
        let sql = format!(
            r"
            INSERT INTO fabrics (name, fabric_type, color, color_hex, image, price_modifier, in_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            {conflict}
            RETURNING *
            "
        );

        let fabric = sqlx::query_as::<_, Fabric>(&sql)
            .bind(new.name.trim())
            .bind(new.fabric_type.trim())
            .bind(new.color.trim())
            .bind(&new.color_hex)
            .bind(&new.image)
            .bind(new.price_modifier)
            .bind(new.in_stock)
            .fetch_one(self.pool)
            .await?;
        Ok(fabric)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM fabrics").execute(self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Repository for browsable categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories ORDER BY display_order, name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, new: &NewCategory) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            INSERT INTO categories (name, slug, description, image, display_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(new.name.trim())
        .bind(category_slug(new))
        .bind(&new.description)
        .bind(&new.image)
        .bind(new.display_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or_database(e, "a category with this slug already exists"))
    }

    /// Insert or replace the category with the same slug. Used by seeding.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_slug(&self, new: &NewCategory) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            INSERT INTO categories (name, slug, description, image, display_order)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (slug) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                image = EXCLUDED.image,
                display_order = EXCLUDED.display_order
            RETURNING *
            ",
        )
        .bind(new.name.trim())
        .bind(category_slug(new))
        .bind(&new.description)
        .bind(&new.image)
        .bind(new.display_order)
        .fetch_one(self.pool)
        .await?;
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM categories").execute(self.pool).await?;
        Ok(result.rows_affected())
    }
}

fn category_slug(new: &NewCategory) -> String {
    slugify(new.slug.as_deref().unwrap_or(&new.name))
}
