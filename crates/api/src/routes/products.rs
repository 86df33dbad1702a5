//! Product catalog routes.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use casawood_core::{ProductCategory, ProductId};

use super::parse_id;
use crate::db::{Page, RepositoryError};
use crate::db::products::{ProductFilter, ProductRepository, ProductSort};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::response::{ApiResponse, message_only};
use crate::state::AppState;

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    fn filter(&self) -> Result<ProductFilter> {
        let category = self
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(str::parse::<ProductCategory>)
            .transpose()
            .map_err(|e| AppError::invalid("category", e.to_string()))?;

        Ok(ProductFilter {
            category,
            min_price: self.min_price,
            max_price: self.max_price,
            in_stock: self.in_stock,
            featured: self.featured,
            search: self.search.clone(),
            sort: ProductSort::from_query(self.sort.as_deref()),
        })
    }
}

fn product_not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
        other => other.into(),
    }
}

/// List products.
///
/// GET /api/products
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<ProductQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<Product>>> {
    let Query(query) = query?;
    let filter = query.filter()?;
    let page = Page::new(query.page, query.limit);

    let (products, total) = ProductRepository::new(state.pool())
        .list(&filter, page)
        .await?;

    Ok(ApiResponse::paginated(products, page, total))
}

/// Product detail.
///
/// GET /api/products/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Product>> {
    let id: ProductId = parse_id(&id, "Product")?;
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(ApiResponse::ok(product))
}

/// Create a product.
///
/// POST /api/products
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: std::result::Result<Json<NewProduct>, JsonRejection>,
) -> Result<ApiResponse<Product>> {
    let Json(new) = body?;
    new.validate().map_err(AppError::Validation)?;

    let product = ProductRepository::new(state.pool()).create(&new).await?;
    tracing::info!(product_id = %product.id, slug = %product.slug, "Product created");
    Ok(ApiResponse::created(product).with_message("Product created"))
}

/// Partially update a product.
///
/// PUT /api/products/{id}
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    body: std::result::Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<ApiResponse<Product>> {
    let id: ProductId = parse_id(&id, "Product")?;
    let Json(update) = body?;
    update.validate().map_err(AppError::Validation)?;

    let product = ProductRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(product_not_found)?;
    Ok(ApiResponse::ok(product).with_message("Product updated"))
}

/// Delete a product.
///
/// DELETE /api/products/{id}
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>> {
    let id: ProductId = parse_id(&id, "Product")?;
    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(product_not_found)?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(message_only("Product deleted"))
}

#[derive(Debug, Deserialize)]
pub struct StockRequest {
    pub quantity: i32,
}

/// Set the stock level; `inStock` follows it.
///
/// PATCH /api/products/{id}/stock
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn update_stock(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    body: std::result::Result<Json<StockRequest>, JsonRejection>,
) -> Result<ApiResponse<Product>> {
    let id: ProductId = parse_id(&id, "Product")?;
    let Json(StockRequest { quantity }) = body?;
    if quantity < 0 {
        return Err(AppError::invalid("quantity", "Stock cannot be negative"));
    }

    let product = ProductRepository::new(state.pool())
        .set_stock(id, quantity)
        .await
        .map_err(product_not_found)?;
    Ok(ApiResponse::ok(product).with_message("Stock updated"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builds_filter() {
        let query: ProductQuery =
            serde_json::from_value(serde_json::json!({"category": "Sofas", "inStock": true, "sort": "price_desc"}))
                .unwrap();
        let filter = query.filter().unwrap();
        assert_eq!(filter.category, Some(ProductCategory::Sofas));
        assert_eq!(filter.in_stock, Some(true));
        assert_eq!(filter.sort, ProductSort::PriceDesc);
    }

    #[test]
    fn test_blank_category_is_no_filter() {
        let query = ProductQuery {
            category: Some(String::new()),
            ..ProductQuery::default()
        };
        assert!(query.filter().unwrap().category.is_none());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let query = ProductQuery {
            category: Some("hammocks".to_string()),
            ..ProductQuery::default()
        };
        assert!(matches!(query.filter(), Err(AppError::Validation(_))));
    }
}
