//! Generic-to-provider commit-status state mapping.

use crate::GenericStatusState;

/// Map a [`GenericStatusState`] onto the GitHub statuses-API vocabulary.
///
/// | Generic | GitHub |
/// |---|---|
/// | pending | pending |
/// | running | pending |
/// | success | success |
/// | failure | failure |
/// | error | error |
/// | cancelled | error |
pub fn to_github(state: GenericStatusState) -> &'static str {
    match state {
        GenericStatusState::Pending | GenericStatusState::Running => "pending",
        GenericStatusState::Success => "success",
        GenericStatusState::Failure => "failure",
        GenericStatusState::Error | GenericStatusState::Cancelled => "error",
    }
}

/// Map a [`GenericStatusState`] onto the GitLab commit-status vocabulary.
///
/// | Generic | GitLab |
/// |---|---|
/// | pending | pending |
/// | running | running |
/// | success | success |
/// | failure | failed |
/// | error | failed |
/// | cancelled | canceled |
pub fn to_gitlab(state: GenericStatusState) -> &'static str {
    match state {
        GenericStatusState::Pending => "pending",
        GenericStatusState::Running => "running",
        GenericStatusState::Success => "success",
        GenericStatusState::Failure | GenericStatusState::Error => "failed",
        GenericStatusState::Cancelled => "canceled",
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
