//! Wishlist routes.

use axum::extract::{Path, State};
use tracing::instrument;

use casawood_core::ProductId;

use super::parse_id;
use crate::db::RepositoryError;
use crate::db::wishlist::WishlistRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Product;
use crate::response::{ApiResponse, message_only};
use crate::state::AppState;

/// GET /api/wishlist
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse<Vec<Product>>> {
    let products = WishlistRepository::new(state.pool()).list(user.id).await?;
    Ok(ApiResponse::ok(products))
}

/// POST /api/wishlist/{productId}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>> {
    let product_id: ProductId = parse_id(&product_id, "Product")?;
    WishlistRepository::new(state.pool())
        .add(user.id, product_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
            RepositoryError::Conflict(_) => {
                AppError::Conflict("Product already in wishlist".to_string())
            }
            other => other.into(),
        })?;

    Ok(ApiResponse::created(serde_json::Value::Null).with_message("Added to wishlist"))
}

/// DELETE /api/wishlist/{productId}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>> {
    let product_id: ProductId = parse_id(&product_id, "Product")?;
    WishlistRepository::new(state.pool())
        .remove(user.id, product_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound("Product not in wishlist".to_string())
            }
            other => other.into(),
        })?;
    Ok(message_only("Removed from wishlist"))
}
