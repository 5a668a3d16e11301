//! Master-key administration: registration, rotation, decommissioning, and
//! primary-flag reconciliation. Every route here requires an admin token.

use crate::auth::require_admin;
use crate::responses::{MasterKeyResponse, RegisterMasterKeyRequest, RotateMasterKeyResponse, StatusResponse};
use crate::errors::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

pub async fn list_master_keys(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<MasterKeyResponse>>, ApiError> {
    require_admin(&state, &headers)?;
    let keys = state.secrets.master_keys.list().await?;
    Ok(Json(keys.iter().map(MasterKeyResponse::from).collect()))
}

pub async fn register_master_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterMasterKeyRequest>,
) -> Result<Json<MasterKeyResponse>, ApiError> {
    require_admin(&state, &headers)?;
    let key = state.secrets.master_keys.register(&request.name, &request.description).await?;
    Ok(Json(MasterKeyResponse::from(&key)))
}

pub async fn rotate_master_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<RotateMasterKeyResponse>, ApiError> {
    require_admin(&state, &headers)?;
    let failed_org_ids = state.secrets.rotate_to(&name).await?;
    Ok(Json(RotateMasterKeyResponse { failed_org_ids }))
}

pub async fn decommission_master_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    require_admin(&state, &headers)?;

    let still_referenced = state.secrets.master_key_is_referenced(&name).await?;
    state.secrets.master_keys.decommission(&name, still_referenced).await?;
    Ok(Json(StatusResponse::ok()))
}

pub async fn sync_primary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, ApiError> {
    require_admin(&state, &headers)?;
    state.secrets.master_keys.sync_primary().await?;
    Ok(Json(StatusResponse::ok()))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
