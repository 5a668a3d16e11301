//! # Job Data Model
//!
//! A [`Job`] is one invocation of an eval or a real CI run: an untrusted
//! source under test, an optional trusted CI source, the execution
//! parameters handed to the runner, and the lifecycle status the dispatcher
//! and status reconciler drive forward.

use crate::{JobId, ProjectId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The kind of source a job's code comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Git,
    Copy,
    None,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Copy => "copy",
            Self::None => "none",
        }
    }
}

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Submitted,
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
    Timeout,
}

impl JobStatus {
    /// Terminal statuses are the ones after which no further dispatcher
    /// feedback is expected and a PR comment may be posted.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Timeout
        )
    }
}

/// One invocation of an eval or a real CI run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub project_id: Option<ProjectId>,
    pub dispatcher_task_id: Option<String>,

    /// Human-readable label, e.g. `eval: PR #42 opened on org/repo`. Display
    /// only; never parsed by downstream components.
    pub name: String,

    // Untrusted source under test.
    pub source_type: SourceType,
    pub source_url: String,
    pub source_ref: String,
    pub source_path: String,

    // Trusted CI-pipeline source. `ci_source_type` must be "git" or empty.
    pub ci_source_type: String,
    pub ci_source_url: String,
    pub ci_source_ref: String,

    // Execution.
    pub job_command: String,
    pub runner_image: String,
    pub code_dir: String,
    pub job_dir: String,
    pub env_vars: HashMap<String, String>,
    pub env_file: String,
    pub timeout_seconds: u64,
    pub priority: i32,
    pub queue_name: String,

    // Status.
    pub status: JobStatus,
    pub exit_code: Option<i32>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub logs_object_key: Option<String>,
    pub last_error: Option<String>,

    /// Opaque JSON blob carrying VCS metadata for the reconciler. See
    /// [`crate::notes::JobNotes`] for the typed shape.
    pub notes: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    /// `true` iff no dispatcher task has been recorded for this job, which
    /// is only a valid state for `submitted` or `failed` jobs.
    pub fn is_undispatched(&self) -> bool {
        self.dispatcher_task_id.is_none()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
