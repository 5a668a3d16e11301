//! # Project Configuration and Registry
//!
//! A [`Project`] is the unit of per-repository configuration: which events
//! and branches it cares about, its dual-source defaults, runner defaults,
//! and the secret references pointing into the encrypted secret store. The
//! [`ProjectRegistry`] trait is a contract only — persistence lives outside
//! this crate; this module owns the data shape and the two predicates the
//! webhook pipeline depends on.

use crate::event_classifier::GenericEvent;
use crate::url_canon;
use crate::{CoreResult, ProjectId, Timestamp};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-repository configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,

    /// Stored in canonical form; see [`url_canon::canonicalize`].
    pub repo_url: String,

    pub name: String,
    pub description: String,
    pub enabled: bool,

    /// Empty means "all branches".
    pub target_branches: Vec<String>,

    /// Empty means "all generic event types".
    pub allowed_event_types: HashSet<GenericEvent>,

    pub default_ci_source_type: String,
    pub default_ci_source_url: String,
    pub default_ci_source_ref: String,

    pub default_image: String,
    pub default_job_command: String,
    pub default_timeout_seconds: u64,
    pub default_queue_name: String,

    /// `<path>:<key>` reference into the secret store.
    pub vcs_token_secret: String,
    /// `<path>:<key>` reference into the secret store.
    pub webhook_secret: String,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Normalize `repo_url` before storing; callers constructing a `Project`
    /// outside of this helper are responsible for the same invariant.
    pub fn canonical_repo_url(raw_repo_url: &str) -> String {
        url_canon::canonicalize(raw_repo_url)
    }

    /// `true` iff the event/branch should be processed by this project: the
    /// generic event is in `allowed_event_types` (or that set is empty,
    /// meaning "all"), *and* the branch-or-tag is in `target_branches` (or
    /// that list is empty, meaning "all").
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reactorcide_core::event_classifier::GenericEvent;
    /// use reactorcide_core::project::Project;
    /// use std::collections::HashSet;
    ///
    /// let mut project = test_project();
    /// project.allowed_event_types = HashSet::from([GenericEvent::Push]);
    /// project.target_branches = vec!["main".to_string()];
    ///
    /// assert!(!project.should_process_event(GenericEvent::Push, "feature/x"));
    /// assert!(project.should_process_event(GenericEvent::Push, "main"));
    ///
    /// # fn test_project() -> Project {
    /// #     reactorcide_core::project::test_support::empty_project()
    /// # }
    /// ```
    pub fn should_process_event(&self, event: GenericEvent, branch_or_tag: &str) -> bool {
        let event_ok = self.allowed_event_types.is_empty()
            || self.allowed_event_types.contains(&event);
        let branch_ok =
            self.target_branches.is_empty() || self.target_branches.iter().any(|b| b == branch_or_tag);
        event_ok && branch_ok
    }
}

/// Test-only constructors kept public so doctests across the workspace can
/// build a minimal `Project` without duplicating its many fields.
#[doc(hidden)]
pub mod test_support {
    use super::*;

    pub fn empty_project() -> Project {
        Project {
            project_id: ProjectId::new(),
            repo_url: "github.com/org/repo".to_string(),
            name: "repo".to_string(),
            description: String::new(),
            enabled: true,
            target_branches: Vec::new(),
            allowed_event_types: HashSet::new(),
            default_ci_source_type: String::new(),
            default_ci_source_url: String::new(),
            default_ci_source_ref: String::new(),
            default_image: "runner:latest".to_string(),
            default_job_command: String::new(),
            default_timeout_seconds: 0,
            default_queue_name: "default".to_string(),
            vcs_token_secret: String::new(),
            webhook_secret: String::new(),
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }
}

/// Project lookup and filtering contract. Persistence is out of scope for
/// this crate; implementations live in the service crate and are backed by
/// the relational store.
#[async_trait]
pub trait ProjectRegistry: Send + Sync {
    /// Look up a project by (uncanonicalized) repo URL. Implementations must
    /// canonicalize both the input and the stored `repo_url` before
    /// comparing, per [`url_canon::matches`].
    async fn lookup_by_repo_url(&self, repo_url: &str) -> CoreResult<Option<Project>>;

    async fn get(&self, project_id: ProjectId) -> CoreResult<Option<Project>>;
    async fn create(&self, project: Project) -> CoreResult<Project>;
    async fn update(&self, project: Project) -> CoreResult<Project>;
    async fn delete(&self, project_id: ProjectId) -> CoreResult<()>;
    async fn list(&self) -> CoreResult<Vec<Project>>;
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
