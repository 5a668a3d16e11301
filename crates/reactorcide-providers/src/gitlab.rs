//! GitLab-style provider adapter: `X-Gitlab-Token` shared-secret validation
//! and the statuses/notes REST surface.

use crate::status::to_gitlab;
use crate::{extract_form_payload, ProviderAdapter, ProviderError, StatusUpdate, WebhookRequest};
use async_trait::async_trait;
use reactorcide_core::event::{Event, PullRequestInfo, PushInfo, RepoInfo};
use serde_json::Value;
use subtle::ConstantTimeEq;

/// Adapter for GitLab-style webhooks and REST API.
pub struct GitlabAdapter {
    http_client: reqwest::Client,
    api_base_url: String,
}

impl GitlabAdapter {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            api_base_url: "https://gitlab.com/api/v4".to_string(),
        }
    }

    /// Override the API base URL — used in tests against a local mock server.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    fn parse_body(&self, request: &WebhookRequest) -> Result<Value, ProviderError> {
        let bytes = extract_form_payload(&request.body).unwrap_or_else(|| request.body.clone());
        serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::MalformedPayload(format!("invalid JSON body: {e}")))
    }
}

#[async_trait]
impl ProviderAdapter for GitlabAdapter {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    fn parse(&self, request: &WebhookRequest) -> Result<Event, ProviderError> {
        let body = self.parse_body(request)?;
        let event_type = body
            .get("object_kind")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        // GitLab's event vocabulary differs from GitHub's; fold it onto the
        // same `raw_event_type` space the classifier understands.
        let event_type = match event_type.as_str() {
            "merge_request" => "pull_request".to_string(),
            other => other.to_string(),
        };

        let project = body.get("project").or_else(|| body.get("repository"));
        let repo = project
            .map(|r| RepoInfo {
                full_name: r
                    .get("path_with_namespace")
                    .or_else(|| r.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                clone_url: r
                    .get("git_http_url")
                    .or_else(|| r.get("url"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
            .ok_or_else(|| ProviderError::MalformedPayload("missing 'project'".to_string()))?;

        let pr = body.get("object_attributes").filter(|_| event_type == "pull_request").map(|attrs| {
            let action = attrs.get("action").and_then(Value::as_str).unwrap_or_default();
            let state = attrs.get("state").and_then(Value::as_str).unwrap_or_default();
            PullRequestInfo {
                number: attrs.get("iid").and_then(Value::as_u64).unwrap_or_default(),
                action: action.to_string(),
                merged: state == "merged",
                head_sha: attrs
                    .pointer("/last_commit/id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                head_ref: attrs
                    .get("source_branch")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                base_ref: attrs
                    .get("target_branch")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }
        });

        let push = if event_type == "push" {
            Some(PushInfo {
                git_ref: body.get("ref").and_then(Value::as_str).unwrap_or_default().to_string(),
                after: body.get("after").and_then(Value::as_str).unwrap_or_default().to_string(),
            })
        } else {
            None
        };

        Ok(Event {
            provider: "gitlab".to_string(),
            raw_event_type: event_type,
            repo,
            pr,
            push,
            raw_payload: body,
        })
    }

    fn validate(&self, request: &WebhookRequest, secret: &str) -> Result<(), ProviderError> {
        if secret.is_empty() {
            return Err(ProviderError::MissingSecret);
        }

        let token = request.header("X-Gitlab-Token").ok_or(ProviderError::InvalidSignature)?;

        let a = token.as_bytes();
        let b = secret.as_bytes();
        if a.len() != b.len() || a.ct_eq(b).unwrap_u8() != 1 {
            return Err(ProviderError::InvalidSignature);
        }
        Ok(())
    }

    async fn post_status(
        &self,
        repo_full_name: &str,
        token: &str,
        update: &StatusUpdate,
    ) -> Result<(), ProviderError> {
        let project_id = urlencoding_path_component(repo_full_name);
        let url = format!("{}/projects/{}/statuses/{}", self.api_base_url, project_id, update.sha);

        let response = self
            .http_client
            .post(&url)
            .header("PRIVATE-TOKEN", token)
            .query(&[
                ("state", to_gitlab(update.state)),
                ("target_url", update.target_url.as_str()),
                ("description", update.description.as_str()),
                ("context", update.context.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if response.status().as_u16() != 201 {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::UnexpectedStatus { status, body });
        }
        Ok(())
    }

    async fn post_comment(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        token: &str,
        body: &str,
    ) -> Result<(), ProviderError> {
        let project_id = urlencoding_path_component(repo_full_name);
        let url = format!(
            "{}/projects/{}/merge_requests/{}/notes",
            self.api_base_url, project_id, pr_number
        );

        let response = self
            .http_client
            .post(&url)
            .header("PRIVATE-TOKEN", token)
            .query(&[("body", body)])
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if response.status().as_u16() != 201 {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::UnexpectedStatus { status, body });
        }
        Ok(())
    }
}

/// GitLab's project-identifier path segment requires percent-encoding the
/// `/` in a `namespace/project` full name.
fn urlencoding_path_component(value: &str) -> String {
    value.replace('/', "%2F")
}

#[cfg(test)]
#[path = "gitlab_tests.rs"]
mod tests;
