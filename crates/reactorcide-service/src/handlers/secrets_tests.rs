use super::*;
use crate::responses::{BatchGetRequest, BatchSetEntry, BatchSetRequest, SecretRefDto};
use crate::test_support::test_state_with_tokens;
use axum::extract::{Query, State};

fn auth_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("authorization", format!("Bearer {token}").parse().unwrap());
    headers
}

#[tokio::test]
async fn set_then_get_round_trips_through_the_caller_as_org() {
    let (state, token, _) = test_state_with_tokens();

    init_org(State(state.clone()), auth_headers(&token), Json(InitOrgRequest { org_id: "u1".to_string() }))
        .await
        .unwrap();

    set_value(
        State(state.clone()),
        auth_headers(&token),
        Json(SetSecretRequest { path: "ci/webhook".to_string(), key: "github".to_string(), value: "shh".to_string() }),
    )
    .await
    .unwrap();

    let value = get_value(
        State(state),
        auth_headers(&token),
        Query(SecretPathKeyQuery { path: "ci/webhook".to_string(), key: "github".to_string() }),
    )
    .await
    .unwrap()
    .0;
    assert_eq!(value.value, "shh");
}

#[tokio::test]
async fn get_on_an_uninitialized_org_is_rejected() {
    let (state, token, _) = test_state_with_tokens();
    let err = set_value(
        State(state),
        auth_headers(&token),
        Json(SetSecretRequest { path: "ci/webhook".to_string(), key: "github".to_string(), value: "x".to_string() }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError(reactorcide_core::CoreError::PreconditionFailed(_))));
}

#[tokio::test]
async fn list_keys_and_paths_reflect_what_was_set() {
    let (state, token, _) = test_state_with_tokens();
    init_org(State(state.clone()), auth_headers(&token), Json(InitOrgRequest { org_id: "u1".to_string() }))
        .await
        .unwrap();
    set_value(
        State(state.clone()),
        auth_headers(&token),
        Json(SetSecretRequest { path: "ci/webhook".to_string(), key: "github".to_string(), value: "x".to_string() }),
    )
    .await
    .unwrap();

    let keys = list_keys(State(state.clone()), auth_headers(&token), Query(SecretPathQuery { path: "ci/webhook".to_string() }))
        .await
        .unwrap()
        .0;
    assert_eq!(keys.keys, vec!["github".to_string()]);

    let paths = list_paths(State(state), auth_headers(&token)).await.unwrap().0;
    assert_eq!(paths.paths, vec!["ci/webhook".to_string()]);
}

#[tokio::test]
async fn batch_set_then_batch_get_round_trips() {
    let (state, token, _) = test_state_with_tokens();
    init_org(State(state.clone()), auth_headers(&token), Json(InitOrgRequest { org_id: "u1".to_string() }))
        .await
        .unwrap();

    batch_set(
        State(state.clone()),
        auth_headers(&token),
        Json(BatchSetRequest {
            org_id: "u1".to_string(),
            entries: vec![BatchSetEntry { path: "ci/webhook".to_string(), key: "github".to_string(), value: "v1".to_string() }],
        }),
    )
    .await
    .unwrap();

    let response = batch_get(
        State(state),
        auth_headers(&token),
        Json(BatchGetRequest {
            org_id: "u1".to_string(),
            refs: vec![SecretRefDto { path: "ci/webhook".to_string(), key: "github".to_string() }],
        }),
    )
    .await
    .unwrap()
    .0;

    assert_eq!(response.values.get("ci/webhook:github"), Some(&"v1".to_string()));
}

#[tokio::test]
async fn delete_value_removes_an_entry() {
    let (state, token, _) = test_state_with_tokens();
    init_org(State(state.clone()), auth_headers(&token), Json(InitOrgRequest { org_id: "u1".to_string() }))
        .await
        .unwrap();
    set_value(
        State(state.clone()),
        auth_headers(&token),
        Json(SetSecretRequest { path: "ci/webhook".to_string(), key: "github".to_string(), value: "x".to_string() }),
    )
    .await
    .unwrap();

    delete_value(
        State(state.clone()),
        auth_headers(&token),
        Query(SecretPathKeyQuery { path: "ci/webhook".to_string(), key: "github".to_string() }),
    )
    .await
    .unwrap();

    let value = get_value(
        State(state),
        auth_headers(&token),
        Query(SecretPathKeyQuery { path: "ci/webhook".to_string(), key: "github".to_string() }),
    )
    .await
    .unwrap()
    .0;
    assert_eq!(value.value, "");
}
