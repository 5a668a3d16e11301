//! The per-tenant secret KV surface. `org_id` for single-user deployments is
//! the authenticated caller's `user_id`, per the single-tenant simplification
//! noted in the data model (`User` doubles as the org for secret purposes).

use crate::auth::require_token;
use crate::errors::ApiError;
use crate::responses::{
    BatchGetRequest, BatchGetResponse, BatchSetRequest, InitOrgRequest, SecretKeysResponse, SecretPathKeyQuery,
    SecretPathQuery, SecretPathsResponse, SecretValueResponse, SetSecretRequest, StatusResponse,
};
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

pub async fn get_value(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SecretPathKeyQuery>,
) -> Result<Json<SecretValueResponse>, ApiError> {
    let caller = require_token(&state, &headers)?;
    let value = state.secrets.get(&caller.user_id, &query.path, &query.key).await?;
    Ok(Json(SecretValueResponse { value }))
}

pub async fn set_value(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SetSecretRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let caller = require_token(&state, &headers)?;
    state.secrets.set(&caller.user_id, &request.path, &request.key, &request.value).await?;
    Ok(Json(StatusResponse::ok()))
}

pub async fn delete_value(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SecretPathKeyQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    let caller = require_token(&state, &headers)?;
    state.secrets.delete(&caller.user_id, &query.path, &query.key).await?;
    Ok(Json(StatusResponse::ok()))
}

pub async fn list_keys(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SecretPathQuery>,
) -> Result<Json<SecretKeysResponse>, ApiError> {
    let caller = require_token(&state, &headers)?;
    let keys = state.secrets.list_keys(&caller.user_id, &query.path).await?;
    Ok(Json(SecretKeysResponse { keys }))
}

pub async fn list_paths(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SecretPathsResponse>, ApiError> {
    let caller = require_token(&state, &headers)?;
    let paths = state.secrets.list_paths(&caller.user_id).await?;
    Ok(Json(SecretPathsResponse { paths }))
}

pub async fn init_org(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<InitOrgRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    require_token(&state, &headers)?;
    state.secrets.initialize_org(&request.org_id).await?;
    Ok(Json(StatusResponse::ok()))
}

pub async fn batch_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BatchGetRequest>,
) -> Result<Json<BatchGetResponse>, ApiError> {
    require_token(&state, &headers)?;
    let refs: Vec<(String, String)> = request.refs.into_iter().map(|r| (r.path, r.key)).collect();
    let values = state.secrets.get_multi(&request.org_id, &refs).await?;
    Ok(Json(BatchGetResponse { values }))
}

pub async fn batch_set(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BatchSetRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    require_token(&state, &headers)?;
    for entry in request.entries {
        state.secrets.set(&request.org_id, &entry.path, &entry.key, &entry.value).await?;
    }
    Ok(Json(StatusResponse::ok()))
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;
