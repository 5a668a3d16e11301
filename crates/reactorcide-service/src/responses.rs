//! Request/response DTOs for the REST surface. Kept separate from
//! `reactorcide_core`'s domain types so the wire shape can evolve (field
//! renames, pagination envelopes) without touching persistence contracts.

use reactorcide_core::job::{Job, JobStatus, SourceType};
use reactorcide_core::project::Project;
use reactorcide_core::secrets::master_key::MasterKey;
use reactorcide_core::{JobId, ProjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

// ---------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job_id: JobId,
    pub project_id: Option<ProjectId>,
    pub dispatcher_task_id: Option<String>,
    pub name: String,
    pub source_type: SourceType,
    pub source_url: String,
    pub source_ref: String,
    pub ci_source_type: String,
    pub ci_source_url: String,
    pub ci_source_ref: String,
    pub job_command: String,
    pub runner_image: String,
    pub env_vars: HashMap<String, String>,
    pub timeout_seconds: u64,
    pub priority: i32,
    pub queue_name: String,
    pub status: JobStatus,
    pub exit_code: Option<i32>,
    pub last_error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Job> for JobResponse {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.job_id,
            project_id: job.project_id,
            dispatcher_task_id: job.dispatcher_task_id.clone(),
            name: job.name.clone(),
            source_type: job.source_type,
            source_url: job.source_url.clone(),
            source_ref: job.source_ref.clone(),
            ci_source_type: job.ci_source_type.clone(),
            ci_source_url: job.ci_source_url.clone(),
            ci_source_ref: job.ci_source_ref.clone(),
            job_command: job.job_command.clone(),
            runner_image: job.runner_image.clone(),
            env_vars: job.env_vars.clone(),
            timeout_seconds: job.timeout_seconds,
            priority: job.priority,
            queue_name: job.queue_name.clone(),
            status: job.status,
            exit_code: job.exit_code,
            last_error: job.last_error.clone(),
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

/// Direct REST job creation (as opposed to webhook-synthesized eval jobs).
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub project_id: Option<ProjectId>,
    pub name: String,
    pub source_type: SourceType,
    pub source_url: String,
    pub source_ref: String,
    #[serde(default)]
    pub source_path: String,
    #[serde(default)]
    pub ci_source_type: String,
    #[serde(default)]
    pub ci_source_url: String,
    #[serde(default)]
    pub ci_source_ref: String,
    pub job_command: String,
    pub runner_image: String,
    #[serde(default)]
    pub env_vars: HashMap<String, String>,
    #[serde(default)]
    pub timeout_seconds: u64,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_queue_name")]
    pub queue_name: String,
}

fn default_priority() -> i32 {
    5
}

fn default_queue_name() -> String {
    "default".to_string()
}

#[derive(Debug, Deserialize, Default)]
pub struct JobListQuery {
    pub status: Option<JobStatus>,
    pub queue_name: Option<String>,
    pub source_type: Option<SourceType>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    50
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    #[serde(default = "default_stream")]
    pub stream: String,
}

fn default_stream() -> String {
    "combined".to_string()
}

#[derive(Debug, Serialize)]
pub struct LogLineResponse {
    pub timestamp: String,
    pub stream: String,
    pub level: String,
    pub message: String,
}

impl From<reactorcide_core::object_store::LogLine> for LogLineResponse {
    fn from(line: reactorcide_core::object_store::LogLine) -> Self {
        Self {
            timestamp: line.timestamp.to_rfc3339(),
            stream: line.stream,
            level: line.level,
            message: line.message,
        }
    }
}

/// One child job spec accepted by `POST /jobs/{id}/triggers`. The eval job
/// that calls this endpoint supplies only the execution parameters; source
/// identity (untrusted and trusted CI source alike) is always copied from
/// the parent eval job, never taken from the request body — a child job
/// cannot widen its own trust boundary.
#[derive(Debug, Deserialize)]
pub struct TriggerChildJob {
    pub name: String,
    pub job_command: String,
    pub runner_image: String,
    #[serde(default)]
    pub env_vars: HashMap<String, String>,
    #[serde(default)]
    pub timeout_seconds: u64,
    #[serde(default = "default_queue_name")]
    pub queue_name: String,
}

#[derive(Debug, Deserialize)]
pub struct TriggerRequest {
    pub children: Vec<TriggerChildJob>,
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub jobs: Vec<JobResponse>,
}

// ---------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub project_id: ProjectId,
    pub repo_url: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub target_branches: Vec<String>,
    pub default_ci_source_type: String,
    pub default_ci_source_url: String,
    pub default_ci_source_ref: String,
    pub default_image: String,
    pub default_job_command: String,
    pub default_timeout_seconds: u64,
    pub default_queue_name: String,
}

impl From<&Project> for ProjectResponse {
    fn from(project: &Project) -> Self {
        Self {
            project_id: project.project_id,
            repo_url: project.repo_url.clone(),
            name: project.name.clone(),
            description: project.description.clone(),
            enabled: project.enabled,
            target_branches: project.target_branches.clone(),
            default_ci_source_type: project.default_ci_source_type.clone(),
            default_ci_source_url: project.default_ci_source_url.clone(),
            default_ci_source_ref: project.default_ci_source_ref.clone(),
            default_image: project.default_image.clone(),
            default_job_command: project.default_job_command.clone(),
            default_timeout_seconds: project.default_timeout_seconds,
            default_queue_name: project.default_queue_name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub repo_url: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_branches: Vec<String>,
    #[serde(default)]
    pub default_ci_source_type: String,
    #[serde(default)]
    pub default_ci_source_url: String,
    #[serde(default)]
    pub default_ci_source_ref: String,
    #[serde(default)]
    pub default_image: String,
    #[serde(default)]
    pub default_job_command: String,
    #[serde(default)]
    pub default_timeout_seconds: u64,
    #[serde(default = "default_queue_name")]
    pub default_queue_name: String,
    /// `<path>:<key>` secret reference for the GitHub/GitLab signing secret.
    pub webhook_secret: String,
    /// `<path>:<key>` secret reference for the VCS bearer/private token.
    #[serde(default)]
    pub vcs_token_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub target_branches: Option<Vec<String>>,
    pub default_ci_source_type: Option<String>,
    pub default_ci_source_url: Option<String>,
    pub default_ci_source_ref: Option<String>,
    pub default_image: Option<String>,
    pub default_job_command: Option<String>,
    pub default_timeout_seconds: Option<u64>,
    pub default_queue_name: Option<String>,
    pub webhook_secret: Option<String>,
    pub vcs_token_secret: Option<String>,
}

// ---------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateTokenRequest {
    pub user_id: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// The plaintext token is returned exactly once, on creation.
#[derive(Debug, Serialize)]
pub struct CreateTokenResponse {
    pub token: String,
    pub user_id: String,
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
pub struct TokenSummary {
    pub user_id: String,
    pub is_admin: bool,
}

// ---------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SecretPathKeyQuery {
    pub path: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct SecretPathQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct SecretValueResponse {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SetSecretRequest {
    pub path: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SecretKeysResponse {
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SecretPathsResponse {
    pub paths: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct InitOrgRequest {
    pub org_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SecretRefDto {
    pub path: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchGetRequest {
    pub org_id: String,
    pub refs: Vec<SecretRefDto>,
}

#[derive(Debug, Serialize)]
pub struct BatchGetResponse {
    pub values: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchSetEntry {
    pub path: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchSetRequest {
    pub org_id: String,
    pub entries: Vec<BatchSetEntry>,
}

// ---------------------------------------------------------------------
// Admin: master keys
// ---------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct MasterKeyResponse {
    pub name: String,
    pub key_id: String,
    pub is_primary: bool,
    pub is_active: bool,
    pub description: String,
}

impl From<&MasterKey> for MasterKeyResponse {
    fn from(key: &MasterKey) -> Self {
        Self {
            name: key.name.clone(),
            key_id: key.key_id.clone(),
            is_primary: key.is_primary,
            is_active: key.is_active,
            description: key.description.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterMasterKeyRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct RotateMasterKeyResponse {
    pub failed_org_ids: Vec<String>,
}
