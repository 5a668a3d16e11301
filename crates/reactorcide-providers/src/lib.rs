//! # Provider Adapters
//!
//! Translates GitHub-style and GitLab-style webhook traffic into the
//! provider-agnostic [`reactorcide_core::event::Event`] shape, validates
//! inbound signatures, and posts commit statuses and PR/MR comments back to
//! the provider. See [`github`] and [`gitlab`] for the concrete adapters and
//! [`status`] for the generic-to-provider state mapping.

pub mod github;
pub mod gitlab;
pub mod status;

use async_trait::async_trait;
use reactorcide_core::event::Event;
use std::collections::HashMap;
use thiserror::Error;

/// A raw inbound webhook request, as received at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl WebhookRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Generic commit status, independent of provider vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericStatusState {
    Pending,
    Running,
    Success,
    Failure,
    Error,
    Cancelled,
}

/// Parameters for [`ProviderAdapter::post_status`].
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub sha: String,
    pub state: GenericStatusState,
    pub target_url: String,
    pub description: String,
    pub context: String,
}

/// Errors surfaced by a provider adapter. Every fallible operation maps to
/// exactly one of these variants; see `reactorcide-core`'s `CoreError` for
/// how callers fold this into the service-wide error taxonomy.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("webhook secret is not configured")]
    MissingSecret,

    #[error("provider request failed: {0}")]
    RequestFailed(String),

    #[error("provider returned non-success status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

/// The four operations every provider adapter implements: decode a webhook
/// request into an [`Event`], validate its signature, and push status/comment
/// updates back to the provider.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable identifier for this provider, e.g. `"github"` or `"gitlab"`.
    fn name(&self) -> &'static str;

    /// Decode `request.body` (JSON, or form-encoded `payload=<json>`) into a
    /// normalized [`Event`].
    fn parse(&self, request: &WebhookRequest) -> Result<Event, ProviderError>;

    /// Verify `request`'s signature header against `secret`.
    ///
    /// # Errors
    ///
    /// [`ProviderError::MissingSecret`] if `secret` is empty — an empty
    /// webhook secret is a configuration error, not "no signature expected".
    /// [`ProviderError::InvalidSignature`] if the header is absent, malformed,
    /// or does not match.
    fn validate(&self, request: &WebhookRequest, secret: &str) -> Result<(), ProviderError>;

    /// Post a commit status. Returns `Ok(())` on HTTP 201.
    async fn post_status(
        &self,
        repo_full_name: &str,
        token: &str,
        update: &StatusUpdate,
    ) -> Result<(), ProviderError>;

    /// Post a comment on a pull/merge request. Returns `Ok(())` on HTTP 201.
    async fn post_comment(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        token: &str,
        body: &str,
    ) -> Result<(), ProviderError>;
}

/// Decode a form-encoded `payload=<url-encoded-json>` body, as used by
/// GitHub's and GitLab's "application/x-www-form-urlencoded" webhook content
/// type option. Returns `None` if the body does not look form-encoded at all
/// (callers fall back to treating it as raw JSON).
///
/// Exposed crate-externally so the webhook pipeline's pre-validation URL peek
/// (§4.J step 2) can apply the same form-decoding rule the adapters' `parse`
/// uses, without decoding the body twice.
pub fn extract_form_payload(body: &[u8]) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(body).ok()?;
    let value = text
        .split('&')
        .find_map(|pair| pair.strip_prefix("payload="))?;
    Some(form_urlencoded_decode(value))
}

/// Minimal `application/x-www-form-urlencoded` value decoder: `+` → space,
/// `%XX` → raw byte. Operates on bytes throughout so multi-byte UTF-8
/// sequences encoded as consecutive `%XX` escapes survive intact. Sufficient
/// for the single `payload` field providers send; avoids pulling in a
/// dedicated form-parsing crate for one call site.
fn form_urlencoded_decode(value: &str) -> Vec<u8> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 3 <= bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(bytes[i]);
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
