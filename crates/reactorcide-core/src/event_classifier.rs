//! # Event Classifier
//!
//! Maps provider-specific `(event_type, action, ref, merged)` tuples onto the
//! generic taxonomy the rest of the pipeline operates on. Providers speak
//! different vocabularies for the same underlying concept (GitHub's
//! `synchronize` vs. GitLab's `update`, for example); this module is the one
//! place that vocabulary gets normalized away.

use serde::{Deserialize, Serialize};

/// The generic event taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericEvent {
    Push,
    PullRequestOpened,
    PullRequestUpdated,
    PullRequestMerged,
    PullRequestClosed,
    TagCreated,
    Ping,
    Unknown,
}

impl GenericEvent {
    /// The string form used in `REACTORCIDE_EVENT_TYPE` and project
    /// `allowed_event_types` configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::PullRequestOpened => "pull_request_opened",
            Self::PullRequestUpdated => "pull_request_updated",
            Self::PullRequestMerged => "pull_request_merged",
            Self::PullRequestClosed => "pull_request_closed",
            Self::TagCreated => "tag_created",
            Self::Ping => "ping",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for GenericEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pull-request facts carried by a provider payload, as relevant to classification.
#[derive(Debug, Clone)]
pub struct PrFacts {
    pub action: String,
    pub merged: bool,
}

/// Push facts carried by a provider payload, as relevant to classification.
#[derive(Debug, Clone)]
pub struct PushFacts {
    pub git_ref: String,
}

/// Raw, provider-agnostic classification inputs extracted by an adapter's `parse`.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub event_type: String,
    pub pr: Option<PrFacts>,
    pub push: Option<PushFacts>,
}

/// Classify a raw provider event into the generic taxonomy.
///
/// Implements the rules of the event taxonomy: `ping` events classify
/// directly; `push` events are split into `push` vs. `tag_created` by ref
/// prefix; `pull_request` events are classified by `action`, with
/// `action = "closed"` further split by the `merged` flag. Everything else,
/// including unrecognized `event_type`s, classifies as `Unknown` and must be
/// accepted with no further processing by the caller.
///
/// # Examples
///
/// ```rust
/// use reactorcide_core::event_classifier::{classify, GenericEvent, PrFacts, RawEvent};
///
/// let event = RawEvent {
///     event_type: "pull_request".to_string(),
///     pr: Some(PrFacts { action: "closed".to_string(), merged: true }),
///     push: None,
/// };
/// assert_eq!(classify(&event), GenericEvent::PullRequestMerged);
/// ```
pub fn classify(event: &RawEvent) -> GenericEvent {
    match event.event_type.as_str() {
        "ping" => GenericEvent::Ping,
        "push" => match &event.push {
            Some(push) if push.git_ref.starts_with("refs/tags/") => GenericEvent::TagCreated,
            Some(push) if push.git_ref.starts_with("refs/heads/") => GenericEvent::Push,
            Some(_) => GenericEvent::Unknown,
            None => GenericEvent::Unknown,
        },
        "pull_request" => match &event.pr {
            Some(pr) => classify_pr_action(&pr.action, pr.merged),
            None => GenericEvent::Unknown,
        },
        _ => GenericEvent::Unknown,
    }
}

fn classify_pr_action(action: &str, merged: bool) -> GenericEvent {
    match action {
        "opened" | "reopened" => GenericEvent::PullRequestOpened,
        "synchronize" | "update" => GenericEvent::PullRequestUpdated,
        "closed" if merged => GenericEvent::PullRequestMerged,
        "closed" => GenericEvent::PullRequestClosed,
        _ => GenericEvent::Unknown,
    }
}

/// Extract the display branch-or-tag name from a full git ref, stripping the
/// `refs/heads/` or `refs/tags/` prefix. Refs that carry neither prefix are
/// returned unchanged.
///
/// # Examples
///
/// ```rust
/// use reactorcide_core::event_classifier::strip_ref_prefix;
///
/// assert_eq!(strip_ref_prefix("refs/heads/main"), "main");
/// assert_eq!(strip_ref_prefix("refs/tags/v1.0.0"), "v1.0.0");
/// assert_eq!(strip_ref_prefix("main"), "main");
/// ```
pub fn strip_ref_prefix(git_ref: &str) -> &str {
    git_ref
        .strip_prefix("refs/heads/")
        .or_else(|| git_ref.strip_prefix("refs/tags/"))
        .unwrap_or(git_ref)
}

#[cfg(test)]
#[path = "event_classifier_tests.rs"]
mod tests;
