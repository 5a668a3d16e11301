//! # Job Notes
//!
//! `Job::notes` is an opaque JSON blob column; this module is the one typed
//! view onto it. Readers that fail to parse the blob must no-op rather than
//! error, so that old rows written by a previous shape of this struct never
//! break the reconciler (forward compatibility, per the design notes).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobNotes {
    pub vcs_provider: String,
    pub repo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub commit_sha: String,
    pub status_context: String,
    pub is_eval: bool,
}

impl JobNotes {
    /// Serialize to the opaque string form stored on `Job::notes`.
    pub fn to_blob(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse the opaque blob, returning `None` (never an error) on anything
    /// that doesn't look like valid metadata JSON.
    pub fn from_blob(blob: &str) -> Option<Self> {
        serde_json::from_str(blob).ok()
    }
}

#[cfg(test)]
#[path = "notes_tests.rs"]
mod tests;
