//! Shared fixtures for the end-to-end tests in this crate: a fully wired
//! [`AppState`]/router built only through `reactorcide_service`'s public
//! surface, plus small helpers for signing webhook bodies and attaching
//! bearer tokens.

use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use reactorcide_service::config::{ServerConfig, ServiceConfig};
use reactorcide_service::memory::ApiToken;
use reactorcide_service::{create_router, AppState};
use sha2::Sha256;
use std::collections::HashMap;

type HmacSha256 = Hmac<Sha256>;

#[allow(dead_code)]
pub fn master_keys_env() -> String {
    format!("primary:{}", STANDARD.encode([3u8; 32]))
}

/// Build an [`AppState`] wired the same way the binary wires it, with the
/// CI allowlist pre-populated to allow same-repo-mode jobs against
/// `github.com/trusted/ci-repo`.
#[allow(dead_code)]
pub fn test_app_state() -> AppState {
    let config = ServiceConfig {
        server: ServerConfig::default(),
        master_keys_raw: master_keys_env(),
        ci_allowlist: reactorcide_core::allowlist::Allowlist::from_comma_separated(
            "github.com/trusted/ci-repo,github.com/org/repo",
        ),
        global_vcs_tokens: HashMap::new(),
        global_webhook_secrets: HashMap::new(),
        vcs_base_url: "http://localhost:8080".to_string(),
    };
    AppState::new_default(config).expect("app state should build from a valid config")
}

/// A state plus one already-issued, non-admin API token.
#[allow(dead_code)]
pub fn test_app_state_with_token() -> (AppState, String) {
    let state = test_app_state();
    let token = "it-user-token".to_string();
    state.tokens.insert(ApiToken { token: token.clone(), user_id: "u1".to_string(), is_admin: false });
    (state, token)
}

#[allow(dead_code)]
pub fn router(state: AppState) -> axum::Router {
    create_router(state)
}

#[allow(dead_code)]
pub fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("authorization", format!("Bearer {token}").parse().unwrap());
    headers
}

/// GitHub-style `X-Hub-Signature-256` value for `body` under `secret`.
#[allow(dead_code)]
pub fn github_signature(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
