//! Product repository.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use casawood_core::{ProductCategory, ProductId};

use super::{Page, RepositoryError};
use crate::models::{NewProduct, Product, ProductUpdate};

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Rating,
}

impl ProductSort {
    /// Parse the `sort` query value; unknown values fall back to newest.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            Some("rating") => Self::Rating,
            _ => Self::Newest,
        }
    }

    const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "created_at DESC, id DESC",
            Self::PriceAsc => "price ASC, id ASC",
            Self::PriceDesc => "price DESC, id DESC",
            Self::Rating => "rating DESC, review_count DESC, id DESC",
        }
    }
}

/// Listing filters. Every `None` means "don't filter".
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<ProductCategory>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
    pub sort: ProductSort,
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    qb.push(" WHERE TRUE");
    if let Some(category) = filter.category {
        qb.push(" AND category = ").push_bind(category);
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
    if let Some(in_stock) = filter.in_stock {
        qb.push(" AND in_stock = ").push_bind(in_stock);
    }
    if let Some(featured) = filter.featured {
        qb.push(" AND featured = ").push_bind(featured);
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List one page of products matching `filter`, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM products");
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY ")
            .push(filter.sort.order_by())
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let products = query
            .build_query_as::<Product>()
            .fetch_all(self.pool)
            .await?;

        Ok((products, total))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// Insert a product. `in_stock` follows `stock_quantity`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products (
                name, slug, description, price, original_price, category, images,
                stock_quantity, in_stock, featured, rating, specifications, dimensions
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8 > 0, $9, COALESCE($10, 0), COALESCE($11, '{}'::jsonb), $12)
            RETURNING *
            ",
        )
        .bind(new.name.trim())
        .bind(new.resolved_slug())
        .bind(&new.description)
        .bind(new.price)
        .bind(new.original_price)
        .bind(new.category)
        .bind(&new.images)
        .bind(new.stock_quantity)
        .bind(new.featured)
        .bind(new.rating)
        .bind(&new.specifications)
        .bind(&new.dimensions)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or_database(e, "a product with this slug already exists"))
    }

    /// Insert or replace the product with the same slug. Used by seeding.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_slug(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products (
                name, slug, description, price, original_price, category, images,
                stock_quantity, in_stock, featured, rating, specifications, dimensions
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8 > 0, $9, COALESCE($10, 0), COALESCE($11, '{}'::jsonb), $12)
            ON CONFLICT (slug) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                original_price = EXCLUDED.original_price,
                category = EXCLUDED.category,
                images = EXCLUDED.images,
                stock_quantity = EXCLUDED.stock_quantity,
                in_stock = EXCLUDED.in_stock,
                featured = EXCLUDED.featured,
                rating = EXCLUDED.rating,
                specifications = EXCLUDED.specifications,
                dimensions = EXCLUDED.dimensions,
                updated_at = now()
            RETURNING *
            ",
        )
        .bind(new.name.trim())
        .bind(new.resolved_slug())
        .bind(&new.description)
        .bind(new.price)
        .bind(new.original_price)
        .bind(new.category)
        .bind(&new.images)
        .bind(new.stock_quantity)
        .bind(new.featured)
        .bind(new.rating)
        .bind(&new.specifications)
        .bind(&new.dimensions)
        .fetch_one(self.pool)
        .await?;
        Ok(product)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                original_price = COALESCE($5, original_price),
                category = COALESCE($6, category),
                images = COALESCE($7, images),
                stock_quantity = COALESCE($8, stock_quantity),
                in_stock = COALESCE($8, stock_quantity) > 0,
                featured = COALESCE($9, featured),
                specifications = COALESCE($10, specifications),
                dimensions = COALESCE($11, dimensions),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(&update.description)
        .bind(update.price)
        .bind(update.original_price)
        .bind(update.category)
        .bind(&update.images)
        .bind(update.stock_quantity)
        .bind(update.featured)
        .bind(&update.specifications)
        .bind(&update.dimensions)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Set the stock level; the product is in stock iff quantity > 0.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_stock(&self, id: ProductId, quantity: i32) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            UPDATE products
            SET stock_quantity = $2, in_stock = $2 > 0, updated_at = now()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove every product. Used by `seed --clear`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM products").execute(self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_from_query() {
        assert_eq!(ProductSort::from_query(Some("price_asc")), ProductSort::PriceAsc);
        assert_eq!(ProductSort::from_query(Some("rating")), ProductSort::Rating);
        assert_eq!(ProductSort::from_query(Some("bogus")), ProductSort::Newest);
        assert_eq!(ProductSort::from_query(None), ProductSort::Newest);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("sofa"), "sofa");
    }

    #[test]
    fn test_filters_build_expected_sql() {
        let filter = ProductFilter {
            category: Some(ProductCategory::Sofas),
            max_price: Some(Decimal::from(40_000)),
            search: Some("  velvet ".to_string()),
            ..ProductFilter::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM products");
        push_filters(&mut qb, &filter);

        assert_eq!(
            qb.sql(),
            "SELECT * FROM products WHERE TRUE AND category = $1 AND price <= $2 \
             AND (name ILIKE $3 OR description ILIKE $4)"
        );
    }
}
