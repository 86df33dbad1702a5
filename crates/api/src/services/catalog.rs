//! Cached reads of the slow-changing catalog tables.
//!
//! Categories and fabric listings are cached for 5 minutes with `moka`.
//! Admin writes drop the whole cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use crate::db::RepositoryError;
use crate::db::catalog::{CategoryRepository, FabricRepository};
use crate::models::{Category, Fabric};

const TTL: Duration = Duration::from_secs(300);

/// Cache key for catalog listings.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Categories,
    Fabrics {
        fabric_type: Option<String>,
        in_stock: Option<bool>,
    },
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Categories(Arc<Vec<Category>>),
    Fabrics(Arc<Vec<Fabric>>),
}

/// Read-through cache over the category and fabric tables.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(TTL)
            .build();
        Self { cache }
    }

    /// All categories in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache is cold and the query fails.
    pub async fn categories(&self, pool: &PgPool) -> Result<Arc<Vec<Category>>, RepositoryError> {
        let key = CacheKey::Categories;
        if let Some(CacheValue::Categories(categories)) = self.cache.get(&key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = Arc::new(CategoryRepository::new(pool).list().await?);
        self.cache
            .insert(key, CacheValue::Categories(Arc::clone(&categories)))
            .await;
        Ok(categories)
    }

    /// Fabrics matching the optional type and stock filters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache is cold and the query fails.
    pub async fn fabrics(
        &self,
        pool: &PgPool,
        fabric_type: Option<&str>,
        in_stock: Option<bool>,
    ) -> Result<Arc<Vec<Fabric>>, RepositoryError> {
        let key = CacheKey::Fabrics {
            fabric_type: fabric_type.map(str::to_lowercase),
            in_stock,
        };
        if let Some(CacheValue::Fabrics(fabrics)) = self.cache.get(&key).await {
            debug!(?key, "Cache hit for fabrics");
            return Ok(fabrics);
        }

        let fabrics = Arc::new(FabricRepository::new(pool).list(fabric_type, in_stock).await?);
        self.cache
            .insert(key, CacheValue::Fabrics(Arc::clone(&fabrics)))
            .await;
        Ok(fabrics)
    }

    /// Drop every cached listing.
    pub async fn invalidate(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
