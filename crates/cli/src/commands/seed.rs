//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! categories:
//!   - name: Sofas
//!     slug: sofas
//! fabrics:
//!   - name: Mustard Velvet
//!     type: velvet
//!     color: Mustard
//! products:
//!   - name: Aria Three Seater
//!     price: "54999"
//!     category: sofas
//! ```
//!
//! Rows are upserted (categories and products by slug, fabrics by name), so
//! running the same file twice is harmless. The whole file is parsed and
//! validated before connecting to the database.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use casawood_api::db::catalog::{CategoryRepository, FabricRepository};
use casawood_api::db::products::ProductRepository;
use casawood_api::db::{self, RepositoryError};
use casawood_api::models::{NewCategory, NewFabric, NewProduct};

use super::{DATABASE_URL_VAR, database_url};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Contents of a seed file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub categories: Vec<NewCategory>,
    pub fabrics: Vec<NewFabric>,
    pub products: Vec<NewProduct>,
}

impl SeedFile {
    /// Every invalid entry, as `"<section> <name>: <field>: <message>"`.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for category in &self.categories {
            if category.name.trim().is_empty() {
                problems.push("category with an empty name".to_string());
            }
        }
        for fabric in &self.fabrics {
            if let Err(errors) = fabric.validate() {
                problems.extend(
                    errors
                        .into_iter()
                        .map(|e| format!("fabric {}: {}: {}", fabric.name, e.field, e.message)),
                );
            }
        }
        for product in &self.products {
            if let Err(errors) = product.validate() {
                problems.extend(
                    errors
                        .into_iter()
                        .map(|e| format!("product {}: {}: {}", product.name, e.field, e.message)),
                );
            }
        }

        problems
    }
}

/// What a seeding run did.
#[derive(Debug, Default)]
pub struct SeedSummary {
    pub categories: usize,
    pub fabrics: usize,
    pub products: usize,
}

/// Seed categories, fabrics and products from `file_path`.
///
/// # Errors
///
/// Returns `SeedError` if the file can't be read or validated, or if a
/// database operation fails.
pub async fn catalog(file_path: &str, clear_existing: bool) -> Result<SeedSummary, SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_string()));
    }

    info!(path = %file_path, "Loading catalog from file");
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;
    info!(
        categories = seed.categories.len(),
        fabrics = seed.fabrics.len(),
        products = seed.products.len(),
        "Parsed seed file"
    );

    let problems = seed.problems();
    if !problems.is_empty() {
        error!("Seed file validation failed:");
        for problem in &problems {
            error!("  - {problem}");
        }
        return Err(SeedError::Invalid(problems.len()));
    }

    let database_url = database_url().ok_or(SeedError::MissingEnvVar(DATABASE_URL_VAR))?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let categories = CategoryRepository::new(&pool);
    let fabrics = FabricRepository::new(&pool);
    let products = ProductRepository::new(&pool);

    if clear_existing {
        let removed_products = products.delete_all().await?;
        let removed_fabrics = fabrics.delete_all().await?;
        let removed_categories = categories.delete_all().await?;
        info!(
            products = removed_products,
            fabrics = removed_fabrics,
            categories = removed_categories,
            "Cleared existing catalog"
        );
    }

    let mut summary = SeedSummary::default();
    for category in &seed.categories {
        categories.upsert_by_slug(category).await?;
        summary.categories += 1;
    }
    for fabric in &seed.fabrics {
        fabrics.upsert_by_name(fabric).await?;
        summary.fabrics += 1;
    }
    for product in &seed.products {
        products.upsert_by_slug(product).await?;
        summary.products += 1;
    }

    info!("Seeding complete!");
    info!("  Categories upserted: {}", summary.categories);
    info!("  Fabrics upserted: {}", summary.fabrics);
    info!("  Products upserted: {}", summary.products);
    Ok(summary)
}
