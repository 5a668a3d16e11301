//! # Dispatcher Client (contract)
//!
//! The small client-facing contract the external task-queue must satisfy.
//! The queue implementation itself is out of scope; only `submit` and
//! `cancel` matter to the coordinator.

use crate::job::JobStatus;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The payload handed to the dispatcher on submission: the job's identity
/// plus nested configuration the dispatcher is expected to pass through
/// opaquely to the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchPayload {
    pub job_id: String,
    pub config: DispatchConfig,
    pub source: DispatchSource,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub command: String,
    pub image: String,
    pub timeout_seconds: u64,
    pub env_vars: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSource {
    pub source_type: String,
    pub source_url: String,
    pub source_ref: String,
    pub ci_source_type: String,
    pub ci_source_url: String,
    pub ci_source_ref: String,
}

/// The dispatcher's response to `submit` or `cancel`.
#[derive(Debug, Clone)]
pub struct DispatchHandle {
    pub task_id: String,
    pub state: JobStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("dispatcher unavailable: {0}")]
    Unavailable(String),
    #[error("dispatcher rejected submission: {0}")]
    Rejected(String),
}

/// Submit/cancel operations on the external task queue.
///
/// Both operations accept a `priority`/`current_state` the dispatcher treats
/// as opaque ordering hints or idempotency context; neither is otherwise
/// interpreted by this trait's contract.
#[async_trait]
pub trait DispatcherClient: Send + Sync {
    async fn submit(&self, payload: DispatchPayload, priority: i32) -> Result<DispatchHandle, DispatchError>;

    /// Idempotent: calling `cancel` on an already-cancelled or completed task
    /// is not an error. Failure is logged by the caller and does not block
    /// the local transition to `cancelled`.
    async fn cancel(&self, task_id: &str, current_state: JobStatus) -> Result<DispatchHandle, DispatchError>;
}
