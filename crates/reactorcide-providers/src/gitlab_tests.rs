use super::*;
use std::collections::HashMap;

fn mr_payload() -> Vec<u8> {
    serde_json::json!({
        "object_kind": "merge_request",
        "project": {"path_with_namespace": "acme/widgets", "git_http_url": "https://gitlab.com/acme/widgets.git"},
        "object_attributes": {
            "iid": 7,
            "action": "open",
            "state": "opened",
            "source_branch": "feature",
            "target_branch": "main",
            "last_commit": {"id": "def456"},
        },
    })
    .to_string()
    .into_bytes()
}

fn headers() -> HashMap<String, String> {
    HashMap::new()
}

#[test]
fn parse_folds_merge_request_onto_pull_request_vocabulary() {
    let adapter = GitlabAdapter::new(reqwest::Client::new());
    let request = WebhookRequest { headers: headers(), body: mr_payload() };

    let event = adapter.parse(&request).unwrap();
    assert_eq!(event.raw_event_type, "pull_request");
    assert_eq!(event.repo.full_name, "acme/widgets");
    let pr = event.pr.unwrap();
    assert_eq!(pr.number, 7);
    assert_eq!(pr.head_sha, "def456");
    assert!(!pr.merged);
}

#[test]
fn parse_marks_merged_state_as_merged() {
    let adapter = GitlabAdapter::new(reqwest::Client::new());
    let mut body = serde_json::from_slice::<serde_json::Value>(&mr_payload()).unwrap();
    body["object_attributes"]["state"] = serde_json::json!("merged");
    let request = WebhookRequest { headers: headers(), body: body.to_string().into_bytes() };

    let event = adapter.parse(&request).unwrap();
    assert!(event.pr.unwrap().merged);
}

#[test]
fn validate_accepts_matching_token() {
    let adapter = GitlabAdapter::new(reqwest::Client::new());
    let mut hdrs = headers();
    hdrs.insert("X-Gitlab-Token".to_string(), "s3cret".to_string());
    let request = WebhookRequest { headers: hdrs, body: vec![] };

    adapter.validate(&request, "s3cret").unwrap();
}

#[test]
fn validate_rejects_mismatched_token() {
    let adapter = GitlabAdapter::new(reqwest::Client::new());
    let mut hdrs = headers();
    hdrs.insert("X-Gitlab-Token".to_string(), "wrong".to_string());
    let request = WebhookRequest { headers: hdrs, body: vec![] };

    assert!(matches!(adapter.validate(&request, "s3cret"), Err(ProviderError::InvalidSignature)));
}

#[test]
fn validate_rejects_empty_secret_as_configuration_error() {
    let adapter = GitlabAdapter::new(reqwest::Client::new());
    let request = WebhookRequest { headers: headers(), body: vec![] };
    assert!(matches!(adapter.validate(&request, ""), Err(ProviderError::MissingSecret)));
}

#[tokio::test]
async fn post_status_percent_encodes_project_path() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/acme%2Fwidgets/statuses/def456"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let adapter = GitlabAdapter::new(reqwest::Client::new()).with_api_base_url(server.uri());
    let update = StatusUpdate {
        sha: "def456".to_string(),
        state: crate::GenericStatusState::Running,
        target_url: String::new(),
        description: String::new(),
        context: "reactorcide".to_string(),
    };

    adapter.post_status("acme/widgets", "tok", &update).await.unwrap();
}
