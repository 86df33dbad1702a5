//! Fabric routes.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
};
use serde::Deserialize;
use tracing::instrument;

use casawood_core::FabricId;

use super::parse_id;
use crate::db::catalog::FabricRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Fabric, NewFabric};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricQuery {
    #[serde(rename = "type")]
    pub fabric_type: Option<String>,
    pub in_stock: Option<bool>,
}

/// GET /api/fabrics
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<FabricQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<Fabric>>> {
    let Query(query) = query?;
    let fabric_type = query
        .fabric_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let fabrics = state
        .catalog()
        .fabrics(state.pool(), fabric_type, query.in_stock)
        .await?;
    Ok(ApiResponse::ok(fabrics.as_ref().clone()))
}

/// GET /api/fabrics/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Fabric>> {
    let id: FabricId = parse_id(&id, "Fabric")?;
    let fabric = FabricRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Fabric not found".to_string()))?;
    Ok(ApiResponse::ok(fabric))
}

/// POST /api/fabrics
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: std::result::Result<Json<NewFabric>, JsonRejection>,
) -> Result<ApiResponse<Fabric>> {
    let Json(new) = body?;
    new.validate().map_err(AppError::Validation)?;

    let fabric = FabricRepository::new(state.pool()).create(&new).await?;
    state.catalog().invalidate().await;

    tracing::info!(fabric_id = %fabric.id, name = %fabric.name, "Fabric created");
    Ok(ApiResponse::created(fabric).with_message("Fabric created"))
}
