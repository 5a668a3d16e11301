//! # CI-Allowlist Enforcer
//!
//! Gates job creation on the trusted CI source being one the operator has
//! actually vetted. Without this check, a pull-request author could point
//! `ci_source_url` at their own fork and have the coordinator execute
//! arbitrary pipeline code with the project's privileges.

use crate::url_canon;
use crate::CoreError;

/// The operator-configured set of trusted CI-repo URLs, each canonicalized
/// once at construction time.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    canonical_entries: Vec<String>,
}

impl Allowlist {
    /// Build an allowlist from a comma-separated list of clone URLs, as read
    /// from `CI_CODE_ALLOWLIST`. An empty list is accepted but logs a
    /// warning; production deployments must not run with one.
    pub fn from_comma_separated(raw: &str) -> Self {
        let canonical_entries: Vec<String> = raw
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(url_canon::canonicalize)
            .collect();
        if canonical_entries.is_empty() {
            tracing::warn!("CI-source allowlist is empty; every dual-source job will be rejected");
        }
        Self { canonical_entries }
    }

    pub fn is_empty(&self) -> bool {
        self.canonical_entries.is_empty()
    }

    fn contains(&self, ci_source_url: &str) -> bool {
        let canonical = url_canon::canonicalize(ci_source_url);
        self.canonical_entries.iter().any(|entry| entry == &canonical)
    }

    /// Enforce the allowlist for a job carrying a non-empty `ci_source_*`.
    ///
    /// `ci_source_type` must be `"git"` — `"copy"` would let an attacker hand
    /// the runner an inline tarball instead of a reviewable git ref, so it is
    /// always rejected. An empty `ci_source_url` (no dedicated CI source
    /// configured) is not checked here; same-repo mode is a job-builder
    /// concern, not an allowlist concern.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reactorcide_core::allowlist::Allowlist;
    ///
    /// let allowlist = Allowlist::from_comma_separated("github.com/trusted/ci-repo");
    /// let err = allowlist
    ///     .enforce("git", "https://github.com/malicious/ci-repo.git")
    ///     .unwrap_err();
    /// assert!(matches!(err, reactorcide_core::CoreError::Forbidden(_)));
    /// ```
    pub fn enforce(&self, ci_source_type: &str, ci_source_url: &str) -> Result<(), CoreError> {
        if ci_source_url.is_empty() {
            return Ok(());
        }

        if ci_source_type != "git" {
            return Err(CoreError::InvalidInput(format!(
                "ci_source_type must be 'git', got '{ci_source_type}'"
            )));
        }

        if !self.contains(ci_source_url) {
            return Err(CoreError::Forbidden(format!(
                "ci_source_url '{ci_source_url}' is not in the CI source allowlist"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "allowlist_tests.rs"]
mod tests;
