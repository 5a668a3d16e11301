//! # Job Store (contract)
//!
//! Persistence of [`Job`] rows. The relational implementation lives outside
//! this crate (see `SYSTEM OVERVIEW`); only the operations and filter shape
//! are specified here.

use crate::job::{Job, JobStatus, SourceType};
use crate::{CoreResult, JobId};
use async_trait::async_trait;

/// Filters accepted by [`JobStore::list`]. All fields are optional; `None`
/// means "no filter on this dimension".
#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    pub user_id: Option<String>,
    pub status: Option<JobStatus>,
    pub queue_name: Option<String>,
    pub source_type: Option<SourceType>,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: Job) -> CoreResult<Job>;
    async fn update(&self, job: Job) -> CoreResult<Job>;
    async fn get(&self, job_id: JobId) -> CoreResult<Option<Job>>;
    async fn delete(&self, job_id: JobId) -> CoreResult<()>;
    async fn list(&self, filters: JobFilters, limit: u32, offset: u32) -> CoreResult<Vec<Job>>;
    async fn get_by_user(&self, user_id: &str) -> CoreResult<Vec<Job>>;
    async fn get_by_repo_url(&self, repo_url: &str) -> CoreResult<Vec<Job>>;
}
