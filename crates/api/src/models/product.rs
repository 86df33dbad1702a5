//! Catalog product.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use casawood_core::{ProductCategory, ProductId};

use crate::error::FieldError;

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    /// List price before markdown; shown struck through when higher than `price`.
    pub original_price: Option<Decimal>,
    pub category: ProductCategory,
    pub images: Vec<String>,
    pub in_stock: bool,
    pub stock_quantity: i32,
    pub rating: f64,
    pub review_count: i32,
    pub featured: bool,
    pub specifications: serde_json::Value,
    pub dimensions: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    /// Derived from `name` when absent.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    pub category: ProductCategory,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub specifications: Option<serde_json::Value>,
    #[serde(default)]
    pub dimensions: Option<serde_json::Value>,
}

impl NewProduct {
    /// Check field ranges, returning every failure.
    ///
    /// # Errors
    ///
    /// Returns the list of invalid fields.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Product name is required"));
        }
        if self.price < Decimal::ZERO {
            errors.push(FieldError::new("price", "Price cannot be negative"));
        }
        if self.original_price.is_some_and(|p| p < Decimal::ZERO) {
            errors.push(FieldError::new("originalPrice", "Original price cannot be negative"));
        }
        if self.stock_quantity < 0 {
            errors.push(FieldError::new("stockQuantity", "Stock cannot be negative"));
        }
        if self.rating.is_some_and(|r| !(0.0..=5.0).contains(&r)) {
            errors.push(FieldError::new("rating", "Rating must be between 0 and 5"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Slug to store: the given one normalised, or one derived from the name.
    #[must_use]
    pub fn resolved_slug(&self) -> String {
        slugify(self.slug.as_deref().unwrap_or(&self.name))
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub category: Option<ProductCategory>,
    pub images: Option<Vec<String>>,
    pub stock_quantity: Option<i32>,
    pub featured: Option<bool>,
    pub specifications: Option<serde_json::Value>,
    pub dimensions: Option<serde_json::Value>,
}

impl ProductUpdate {
    /// # Errors
    ///
    /// Returns the list of invalid fields.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            errors.push(FieldError::new("name", "Product name cannot be empty"));
        }
        if self.price.is_some_and(|p| p < Decimal::ZERO) {
            errors.push(FieldError::new("price", "Price cannot be negative"));
        }
        if self.stock_quantity.is_some_and(|q| q < 0) {
            errors.push(FieldError::new("stockQuantity", "Stock cannot be negative"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// URL slug: lowercase ASCII alphanumerics separated by single dashes.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Aarav 3-Seater Sofa"), "aarav-3-seater-sofa");
        assert_eq!(slugify("  Teak & Cane -- Chair!  "), "teak-cane-chair");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_new_product_defaults_and_slug() {
        let product: NewProduct = serde_json::from_value(serde_json::json!({
            "name": "Nilgiri King Bed",
            "price": "45999.00",
            "category": "beds",
        }))
        .unwrap();

        assert!(product.validate().is_ok());
        assert_eq!(product.resolved_slug(), "nilgiri-king-bed");
        assert!(product.images.is_empty());
        assert!(!product.featured);
    }

    #[test]
    fn test_new_product_validation_collects_all_errors() {
        let product: NewProduct = serde_json::from_value(serde_json::json!({
            "name": " ",
            "price": "-1",
            "category": "decor",
            "stockQuantity": -4,
        }))
        .unwrap();

        let errors = product.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "price", "stockQuantity"]);
    }

    #[test]
    fn test_unknown_category_fails_to_deserialize() {
        let result = serde_json::from_value::<NewProduct>(serde_json::json!({
            "name": "Lamp",
            "price": "10",
            "category": "lighting",
        }));
        assert!(result.is_err());
    }
}
