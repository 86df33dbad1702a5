//! Database operations for the Casawood `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts (password and/or Google)
//! - `products`, `fabrics`, `categories` - Catalog
//! - `carts`, `cart_items` - One cart per user or guest id; saved-for-later is a flag on the line
//! - `addresses` - Address book, at most one default per user
//! - `orders` - Placed orders with JSON item and address snapshots
//! - `wishlist_items` - (user, product) pairs
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p casawood-cli -- migrate
//! ```
//!
//! Queries are runtime-checked (`sqlx::query_as`), so building the crate does
//! not need a live database.

pub mod addresses;
pub mod carts;
pub mod catalog;
pub mod orders;
pub mod products;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn unique_or_database(e: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// A page request, already clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 12;
    pub const MAX_LIMIT: u32 = 100;

    /// Build from optional query values: page defaults to 1, limit to 12
    /// and is capped at 100.
    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    #[must_use]
    pub const fn number(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    /// Number of pages needed for `total` rows.
    #[must_use]
    pub fn page_count(&self, total: i64) -> i64 {
        let limit = self.limit();
        (total.max(0) + limit - 1) / limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page = Page::new(None, None);
        assert_eq!(page.number(), 1);
        assert_eq!(page.limit(), 12);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_clamps() {
        let page = Page::new(Some(0), Some(500));
        assert_eq!(page.number(), 1);
        assert_eq!(page.limit(), 100);

        assert_eq!(Page::new(Some(3), Some(0)).limit(), 1);
    }

    #[test]
    fn test_offset_and_page_count() {
        let page = Page::new(Some(3), Some(10));
        assert_eq!(page.offset(), 20);
        assert_eq!(page.page_count(0), 0);
        assert_eq!(page.page_count(10), 1);
        assert_eq!(page.page_count(21), 3);
    }
}
