//! # Normalized Webhook Event
//!
//! The output of a provider adapter's `parse` operation: repository identity,
//! PR or push facts, and the raw event type/payload needed downstream by the
//! classifier and the eval-job builder. This is the wire-format-independent
//! shape every provider adapter converges on.

use crate::event_classifier::{PrFacts, PushFacts, RawEvent};
use serde::{Deserialize, Serialize};

/// Repository identity as carried by a webhook payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoInfo {
    /// `owner/name`, e.g. `org/repo`.
    pub full_name: String,
    pub clone_url: String,
}

/// Pull/merge-request facts needed for job synthesis and classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestInfo {
    pub number: u64,
    pub action: String,
    pub merged: bool,
    pub head_sha: String,
    pub head_ref: String,
    pub base_ref: String,
}

/// Push/tag facts needed for job synthesis and classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushInfo {
    /// Full ref, e.g. `refs/heads/main` or `refs/tags/v1.0.0`.
    pub git_ref: String,
    /// Commit SHA the ref now points at.
    pub after: String,
}

/// A fully parsed, provider-agnostic webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub provider: String,
    pub raw_event_type: String,
    pub repo: RepoInfo,
    pub pr: Option<PullRequestInfo>,
    pub push: Option<PushInfo>,
    pub raw_payload: serde_json::Value,
}

impl Event {
    /// Project the fields [`crate::event_classifier::classify`] needs out of
    /// this event.
    pub fn to_raw_classification(&self) -> RawEvent {
        RawEvent {
            event_type: self.raw_event_type.clone(),
            pr: self.pr.as_ref().map(|pr| PrFacts {
                action: pr.action.clone(),
                merged: pr.merged,
            }),
            push: self.push.as_ref().map(|push| PushFacts {
                git_ref: push.git_ref.clone(),
            }),
        }
    }
}
