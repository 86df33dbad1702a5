//! Cart routes.
//!
//! Every handler resolves the caller's cart through [`CartIdentity`]: the
//! signed-in user's cart, or the guest cart named by `x-guest-id`.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;
use tracing::instrument;

use casawood_core::{CartId, CartItemId, FabricId, ProductId};

use super::parse_id;
use crate::db::RepositoryError;
use crate::db::carts::{CartRepository, MAX_LINE_QUANTITY, NewCartLine};
use crate::db::catalog::FabricRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::is_valid_guest_id;
use crate::middleware::{CartIdentity, RequireAuth};
use crate::models::{CartOwner, CartView};
use crate::response::ApiResponse;
use crate::state::AppState;

const fn default_quantity() -> i32 {
    1
}

fn check_quantity(quantity: i32) -> Result<()> {
    if (1..=MAX_LINE_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        Err(AppError::invalid(
            "quantity",
            format!("Quantity must be between 1 and {MAX_LINE_QUANTITY}"),
        ))
    }
}

/// The owner's cart id, or 404 for the line when they have no cart at all.
async fn existing_cart(state: &AppState, owner: &CartOwner) -> Result<CartId> {
    CartRepository::new(state.pool())
        .find(owner)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))
}

async fn view(state: &AppState, owner: &CartOwner) -> Result<CartView> {
    Ok(CartRepository::new(state.pool()).view(owner).await?)
}

fn item_not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("Cart item not found".to_string()),
        other => other.into(),
    }
}

/// Current cart.
///
/// GET /api/cart
#[instrument(skip(state, owner), fields(owner = %owner.0))]
pub async fn show(
    State(state): State<AppState>,
    owner: CartIdentity,
) -> Result<ApiResponse<CartView>> {
    Ok(ApiResponse::ok(view(&state, &owner.0).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub fabric_id: Option<FabricId>,
    #[serde(default)]
    pub variant: Option<String>,
}

/// Add a product to the cart.
///
/// POST /api/cart/items
#[instrument(skip(state, owner, body), fields(owner = %owner.0))]
pub async fn add(
    State(state): State<AppState>,
    owner: CartIdentity,
    body: std::result::Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<ApiResponse<CartView>> {
    let Json(body) = body?;
    check_quantity(body.quantity)?;

    let product = ProductRepository::new(state.pool())
        .get(body.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    if !product.in_stock {
        return Err(AppError::BadRequest(format!("{} is out of stock", product.name)));
    }

    if let Some(fabric_id) = body.fabric_id {
        FabricRepository::new(state.pool())
            .get(fabric_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Fabric not found".to_string()))?;
    }

    let carts = CartRepository::new(state.pool());
    let cart_id = carts.get_or_create(&owner.0).await?;
    let line = NewCartLine {
        product_id: product.id,
        fabric_id: body.fabric_id,
        variant: body
            .variant
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
        quantity: body.quantity,
        price: product.price,
        original_price: product.original_price,
    };
    carts.add_item(cart_id, &line).await?;

    Ok(ApiResponse::ok(view(&state, &owner.0).await?).with_message("Item added to cart"))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// Change the quantity of an active line.
///
/// PUT /api/cart/items/{itemId}
#[instrument(skip(state, owner, body), fields(owner = %owner.0))]
pub async fn update(
    State(state): State<AppState>,
    owner: CartIdentity,
    Path(item_id): Path<String>,
    body: std::result::Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<ApiResponse<CartView>> {
    let item_id: CartItemId = parse_id(&item_id, "Cart item")?;
    let Json(UpdateItemRequest { quantity }) = body?;
    check_quantity(quantity)?;

    let cart_id = existing_cart(&state, &owner.0).await?;
    CartRepository::new(state.pool())
        .set_quantity(cart_id, item_id, quantity)
        .await
        .map_err(item_not_found)?;

    Ok(ApiResponse::ok(view(&state, &owner.0).await?).with_message("Cart updated"))
}

/// Remove an active line.
///
/// DELETE /api/cart/items/{itemId}
#[instrument(skip(state, owner), fields(owner = %owner.0))]
pub async fn remove(
    State(state): State<AppState>,
    owner: CartIdentity,
    Path(item_id): Path<String>,
) -> Result<ApiResponse<CartView>> {
    let item_id: CartItemId = parse_id(&item_id, "Cart item")?;
    let cart_id = existing_cart(&state, &owner.0).await?;
    CartRepository::new(state.pool())
        .remove_item(cart_id, item_id, false)
        .await
        .map_err(item_not_found)?;

    Ok(ApiResponse::ok(view(&state, &owner.0).await?).with_message("Item removed from cart"))
}

/// Move an active line to the saved-for-later list.
///
/// POST /api/cart/items/{itemId}/save-for-later
#[instrument(skip(state, owner), fields(owner = %owner.0))]
pub async fn save_for_later(
    State(state): State<AppState>,
    owner: CartIdentity,
    Path(item_id): Path<String>,
) -> Result<ApiResponse<CartView>> {
    let item_id: CartItemId = parse_id(&item_id, "Cart item")?;
    let cart_id = existing_cart(&state, &owner.0).await?;
    CartRepository::new(state.pool())
        .move_item(cart_id, item_id, false)
        .await
        .map_err(item_not_found)?;

    Ok(ApiResponse::ok(view(&state, &owner.0).await?).with_message("Item saved for later"))
}

/// Move a saved line back into the cart.
///
/// POST /api/cart/saved/{itemId}/move-to-cart
#[instrument(skip(state, owner), fields(owner = %owner.0))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    owner: CartIdentity,
    Path(item_id): Path<String>,
) -> Result<ApiResponse<CartView>> {
    let item_id: CartItemId = parse_id(&item_id, "Cart item")?;
    let cart_id = existing_cart(&state, &owner.0).await?;
    CartRepository::new(state.pool())
        .move_item(cart_id, item_id, true)
        .await
        .map_err(item_not_found)?;

    Ok(ApiResponse::ok(view(&state, &owner.0).await?).with_message("Item moved to cart"))
}

/// Remove a saved line.
///
/// DELETE /api/cart/saved/{itemId}
#[instrument(skip(state, owner), fields(owner = %owner.0))]
pub async fn remove_saved(
    State(state): State<AppState>,
    owner: CartIdentity,
    Path(item_id): Path<String>,
) -> Result<ApiResponse<CartView>> {
    let item_id: CartItemId = parse_id(&item_id, "Cart item")?;
    let cart_id = existing_cart(&state, &owner.0).await?;
    CartRepository::new(state.pool())
        .remove_item(cart_id, item_id, true)
        .await
        .map_err(item_not_found)?;

    Ok(ApiResponse::ok(view(&state, &owner.0).await?).with_message("Saved item removed"))
}

/// Empty the active list; saved lines are kept.
///
/// DELETE /api/cart
#[instrument(skip(state, owner), fields(owner = %owner.0))]
pub async fn clear(
    State(state): State<AppState>,
    owner: CartIdentity,
) -> Result<ApiResponse<CartView>> {
    let carts = CartRepository::new(state.pool());
    if let Some(cart_id) = carts.find(&owner.0).await? {
        carts.clear_active(cart_id).await?;
    }
    Ok(ApiResponse::ok(view(&state, &owner.0).await?).with_message("Cart cleared"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    #[serde(default)]
    pub guest_id: String,
}

/// Fold the guest cart built before sign-in into the user's cart.
///
/// POST /api/cart/merge
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn merge(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<MergeRequest>, JsonRejection>,
) -> Result<ApiResponse<CartView>> {
    let Json(MergeRequest { guest_id }) = body?;
    let guest_id = guest_id.trim();
    if !is_valid_guest_id(guest_id) {
        return Err(AppError::invalid("guestId", "A valid guest ID is required"));
    }

    let merged = CartRepository::new(state.pool())
        .merge_guest(guest_id, user.id)
        .await?;

    let owner = CartOwner::User(user.id);
    let message = if merged == 0 {
        "Nothing to merge"
    } else {
        "Guest cart merged"
    };
    Ok(ApiResponse::ok(view(&state, &owner).await?).with_message(message))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_bounds() {
        assert!(check_quantity(1).is_ok());
        assert!(check_quantity(99).is_ok());
        assert!(check_quantity(0).is_err());
        assert!(check_quantity(100).is_err());
        assert!(check_quantity(-3).is_err());
    }

    #[test]
    fn test_add_request_defaults_quantity() {
        let body: AddItemRequest =
            serde_json::from_value(serde_json::json!({"productId": 4})).unwrap();
        assert_eq!(body.quantity, 1);
        assert!(body.fabric_id.is_none());
    }
}
