//! Address book routes. All are scoped to the signed-in user.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use tracing::instrument;

use casawood_core::AddressId;

use super::parse_id;
use crate::db::RepositoryError;
use crate::db::addresses::AddressRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Address, AddressInput, NewAddress};
use crate::response::{ApiResponse, message_only};
use crate::state::AppState;

fn address_not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("Address not found".to_string()),
        other => other.into(),
    }
}

/// GET /api/addresses
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool()).list(user.id).await?;
    Ok(ApiResponse::ok(addresses))
}

/// GET /api/addresses/{id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<Address>> {
    let id: AddressId = parse_id(&id, "Address")?;
    let address = AddressRepository::new(state.pool())
        .get(user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".to_string()))?;
    Ok(ApiResponse::ok(address))
}

/// Add an address. The first one becomes the default.
///
/// POST /api/addresses
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<AddressInput>, JsonRejection>,
) -> Result<ApiResponse<Address>> {
    let Json(input) = body?;
    let new = NewAddress::try_from(input).map_err(AppError::Validation)?;

    let address = AddressRepository::new(state.pool())
        .create(user.id, &new)
        .await?;
    Ok(ApiResponse::created(address).with_message("Address added"))
}

/// PUT /api/addresses/{id}
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    body: std::result::Result<Json<AddressInput>, JsonRejection>,
) -> Result<ApiResponse<Address>> {
    let id: AddressId = parse_id(&id, "Address")?;
    let Json(input) = body?;
    let new = NewAddress::try_from(input).map_err(AppError::Validation)?;

    let address = AddressRepository::new(state.pool())
        .update(user.id, id, &new)
        .await
        .map_err(address_not_found)?;
    Ok(ApiResponse::ok(address).with_message("Address updated"))
}

/// DELETE /api/addresses/{id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>> {
    let id: AddressId = parse_id(&id, "Address")?;
    AddressRepository::new(state.pool())
        .delete(user.id, id)
        .await
        .map_err(address_not_found)?;
    Ok(message_only("Address deleted"))
}

/// PUT /api/addresses/{id}/default
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn set_default(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<ApiResponse<Address>> {
    let id: AddressId = parse_id(&id, "Address")?;
    let address = AddressRepository::new(state.pool())
        .set_default(user.id, id)
        .await
        .map_err(address_not_found)?;
    Ok(ApiResponse::ok(address).with_message("Default address updated"))
}
