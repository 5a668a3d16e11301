//! GitHub-style provider adapter: `X-Hub-Signature-256` HMAC validation and
//! the statuses/issues REST surface.

use crate::status::to_github;
use crate::{extract_form_payload, ProviderAdapter, ProviderError, StatusUpdate, WebhookRequest};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reactorcide_core::event::{Event, PullRequestInfo, PushInfo, RepoInfo};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Adapter for GitHub-style webhooks and REST API.
pub struct GithubAdapter {
    http_client: reqwest::Client,
    api_base_url: String,
}

impl GithubAdapter {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            api_base_url: "https://api.github.com".to_string(),
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
impl ProviderAdapter for GithubAdapter {
    fn name(&self) -> &'static str {
        "github"
    }

    fn parse(&self, request: &WebhookRequest) -> Result<Event, ProviderError> {
        let body = self.parse_body(request)?;
        let event_type = request
            .header("X-GitHub-Event")
            .unwrap_or("unknown")
            .to_string();

        let repo = body
            .get("repository")
            .map(|r| RepoInfo {
                full_name: r
                    .get("full_name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                clone_url: r
                    .get("clone_url")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
            .ok_or_else(|| ProviderError::MalformedPayload("missing 'repository'".to_string()))?;

        let pr = body.get("pull_request").map(|pr| PullRequestInfo {
            number: body.get("number").and_then(Value::as_u64).unwrap_or_default(),
            action: body
                .get("action")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            merged: pr.get("merged").and_then(Value::as_bool).unwrap_or(false),
            head_sha: pr
                .pointer("/head/sha")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            head_ref: pr
                .pointer("/head/ref")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            base_ref: pr
                .pointer("/base/ref")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
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
            provider: "github".to_string(),
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

        let header = request
            .header("X-Hub-Signature-256")
            .ok_or(ProviderError::InvalidSignature)?;

        let hex_sig = header
            .strip_prefix("sha256=")
            .ok_or(ProviderError::InvalidSignature)?;
        let signature = hex::decode(hex_sig).map_err(|_| ProviderError::InvalidSignature)?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| ProviderError::MalformedPayload(format!("invalid HMAC key: {e}")))?;
        mac.update(&request.body);
        let expected = mac.finalize().into_bytes();
        let expected: &[u8] = expected.as_slice();

        if expected.len() != signature.len() || expected.ct_eq(signature.as_slice()).unwrap_u8() != 1 {
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
        let url = format!(
            "{}/repos/{}/statuses/{}",
            self.api_base_url, repo_full_name, update.sha
        );
        let body = serde_json::json!({
            "state": to_github(update.state),
            "target_url": update.target_url,
            "description": update.description,
            "context": update.context,
        });

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .header("User-Agent", "reactorcide")
            .header("Accept", "application/vnd.github+json")
            .json(&body)
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
        let url = format!(
            "{}/repos/{}/issues/{}/comments",
            self.api_base_url, repo_full_name, pr_number
        );
        let payload = serde_json::json!({ "body": body });

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .header("User-Agent", "reactorcide")
            .header("Accept", "application/vnd.github+json")
            .json(&payload)
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

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
