//! Bearer-token authentication for the REST surface. Every `token`-gated
//! route calls [`require_token`]; `admin`-gated routes additionally call
//! [`require_admin`]. There is no session state beyond the token lookup —
//! each request authenticates independently.

use crate::errors::ApiError;
use crate::memory::ApiToken;
use crate::AppState;
use axum::http::HeaderMap;
use reactorcide_core::CoreError;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers.get("authorization")?.to_str().ok()?.strip_prefix("Bearer ")
}

/// Authenticate the caller. Any authenticated token is sufficient here;
/// admin-only routes layer [`require_admin`] on top.
pub fn require_token(state: &AppState, headers: &HeaderMap) -> Result<ApiToken, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| CoreError::Unauthorized("missing bearer token".to_string()))?;
    state
        .tokens
        .lookup(token)
        .ok_or_else(|| CoreError::Unauthorized("invalid or revoked token".to_string()).into())
}

pub fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<ApiToken, ApiError> {
    let token = require_token(state, headers)?;
    if !token.is_admin {
        return Err(CoreError::Forbidden("admin token required".to_string()).into());
    }
    Ok(token)
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
