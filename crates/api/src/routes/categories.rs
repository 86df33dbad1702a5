//! Category routes.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use tracing::instrument;

use crate::db::catalog::CategoryRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, NewCategory};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/categories
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<ApiResponse<Vec<Category>>> {
    let categories = state.catalog().categories(state.pool()).await?;
    Ok(ApiResponse::ok(categories.as_ref().clone()))
}

/// GET /api/categories/{slug}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<Category>> {
    let category = CategoryRepository::new(state.pool())
        .get_by_slug(&slug.to_lowercase())
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
    Ok(ApiResponse::ok(category))
}

/// POST /api/categories
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: std::result::Result<Json<NewCategory>, JsonRejection>,
) -> Result<ApiResponse<Category>> {
    let Json(new) = body?;
    if new.name.trim().is_empty() {
        return Err(AppError::invalid("name", "Category name is required"));
    }

    let category = CategoryRepository::new(state.pool()).create(&new).await?;
    state.catalog().invalidate().await;

    tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
    Ok(ApiResponse::created(category).with_message("Category created"))
}
