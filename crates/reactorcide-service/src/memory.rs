//! In-memory implementations of the core persistence contracts, used as the
//! service's default wiring (akin to a development/test backing store; a
//! relational/object-store-backed implementation is out of scope for this
//! crate, per [`reactorcide_core::job_store`] and friends).

use async_trait::async_trait;
use reactorcide_core::dispatcher::{DispatchError, DispatchHandle, DispatchPayload, DispatcherClient};
use reactorcide_core::job::{Job, JobStatus};
use reactorcide_core::job_store::{JobFilters, JobStore};
use reactorcide_core::object_store::{ObjectStore, ObjectStoreError};
use reactorcide_core::project::{Project, ProjectRegistry};
use reactorcide_core::secrets::master_key::{MasterKey, MasterKeyRepository};
use reactorcide_core::secrets::{OrgKey, OrgKeyRepository, SecretEntry, SecretEntryRepository};
use reactorcide_core::url_canon;
use reactorcide_core::{CoreError, CoreResult, JobId, ProjectId};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryProjectRegistry {
    rows: RwLock<HashMap<ProjectId, Project>>,
}

#[async_trait]
impl ProjectRegistry for InMemoryProjectRegistry {
    async fn lookup_by_repo_url(&self, repo_url: &str) -> CoreResult<Option<Project>> {
        let canonical = url_canon::canonicalize(repo_url);
        Ok(self
            .rows
            .read()
            .unwrap()
            .values()
            .find(|p| url_canon::canonicalize(&p.repo_url) == canonical)
            .cloned())
    }

    async fn get(&self, project_id: ProjectId) -> CoreResult<Option<Project>> {
        Ok(self.rows.read().unwrap().get(&project_id).cloned())
    }

    async fn create(&self, project: Project) -> CoreResult<Project> {
        self.rows.write().unwrap().insert(project.project_id, project.clone());
        Ok(project)
    }

    async fn update(&self, project: Project) -> CoreResult<Project> {
        let mut rows = self.rows.write().unwrap();
        if !rows.contains_key(&project.project_id) {
            return Err(CoreError::NotFound(format!("project '{}' not found", project.project_id)));
        }
        rows.insert(project.project_id, project.clone());
        Ok(project)
    }

    async fn delete(&self, project_id: ProjectId) -> CoreResult<()> {
        self.rows.write().unwrap().remove(&project_id);
        Ok(())
    }

    async fn list(&self) -> CoreResult<Vec<Project>> {
        Ok(self.rows.read().unwrap().values().cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryJobStore {
    rows: RwLock<HashMap<JobId, Job>>,
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: Job) -> CoreResult<Job> {
        self.rows.write().unwrap().insert(job.job_id, job.clone());
        Ok(job)
    }

    async fn update(&self, job: Job) -> CoreResult<Job> {
        let mut rows = self.rows.write().unwrap();
        if !rows.contains_key(&job.job_id) {
            return Err(CoreError::NotFound(format!("job '{}' not found", job.job_id)));
        }
        rows.insert(job.job_id, job.clone());
        Ok(job)
    }

    async fn get(&self, job_id: JobId) -> CoreResult<Option<Job>> {
        Ok(self.rows.read().unwrap().get(&job_id).cloned())
    }

    async fn delete(&self, job_id: JobId) -> CoreResult<()> {
        self.rows.write().unwrap().remove(&job_id);
        Ok(())
    }

    async fn list(&self, filters: JobFilters, limit: u32, offset: u32) -> CoreResult<Vec<Job>> {
        let rows = self.rows.read().unwrap();
        let mut matched: Vec<Job> = rows
            .values()
            .filter(|job| filters.status.map_or(true, |s| s == job.status))
            .filter(|job| filters.queue_name.as_deref().map_or(true, |q| q == job.queue_name))
            .filter(|job| filters.source_type.map_or(true, |s| s == job.source_type))
            .cloned()
            .collect();
        matched.sort_by_key(|job| job.created_at);
        Ok(matched.into_iter().skip(offset as usize).take(limit as usize).collect())
    }

    async fn get_by_user(&self, _user_id: &str) -> CoreResult<Vec<Job>> {
        // User ownership isn't tracked on `Job` itself in this implementation;
        // callers scope by project instead. Kept as an empty result rather
        // than an error so the contract stays satisfiable.
        Ok(Vec::new())
    }

    async fn get_by_repo_url(&self, repo_url: &str) -> CoreResult<Vec<Job>> {
        let canonical = url_canon::canonicalize(repo_url);
        Ok(self
            .rows
            .read()
            .unwrap()
            .values()
            .filter(|job| url_canon::canonicalize(&job.source_url) == canonical)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryObjectStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        self.blobs
            .read()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), ObjectStoreError> {
        self.blobs.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn list_with_prefix(&self, prefix: &str) -> Result<Vec<String>, ObjectStoreError> {
        Ok(self
            .blobs
            .read()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// An always-succeeds dispatcher used when no real task queue is configured.
/// Transitions every submission straight to `Queued`.
#[derive(Default)]
pub struct NoopDispatcherClient;

#[async_trait]
impl DispatcherClient for NoopDispatcherClient {
    async fn submit(&self, payload: DispatchPayload, _priority: i32) -> Result<DispatchHandle, DispatchError> {
        Ok(DispatchHandle { task_id: format!("noop-{}", payload.job_id), state: JobStatus::Queued })
    }

    async fn cancel(&self, task_id: &str, _current_state: JobStatus) -> Result<DispatchHandle, DispatchError> {
        Ok(DispatchHandle { task_id: task_id.to_string(), state: JobStatus::Cancelled })
    }
}

/// An always-fails dispatcher, used by tests that need to exercise the
/// submit-failure path (job marked `Failed`, `dispatch_submit_failure_total`
/// incremented) without a real task queue.
#[derive(Default)]
pub struct FailingDispatcherClient;

#[async_trait]
impl DispatcherClient for FailingDispatcherClient {
    async fn submit(&self, _payload: DispatchPayload, _priority: i32) -> Result<DispatchHandle, DispatchError> {
        Err(DispatchError::Unavailable("test dispatcher always fails submission".to_string()))
    }

    async fn cancel(&self, task_id: &str, _current_state: JobStatus) -> Result<DispatchHandle, DispatchError> {
        Ok(DispatchHandle { task_id: task_id.to_string(), state: JobStatus::Cancelled })
    }
}

#[derive(Default)]
pub struct InMemoryMasterKeyRepository {
    rows: RwLock<HashMap<String, MasterKey>>,
}

#[async_trait]
impl MasterKeyRepository for InMemoryMasterKeyRepository {
    async fn insert(&self, key: MasterKey) -> CoreResult<MasterKey> {
        self.rows.write().unwrap().insert(key.name.clone(), key.clone());
        Ok(key)
    }

    async fn get_by_name(&self, name: &str) -> CoreResult<Option<MasterKey>> {
        Ok(self.rows.read().unwrap().get(name).cloned())
    }

    async fn list(&self) -> CoreResult<Vec<MasterKey>> {
        Ok(self.rows.read().unwrap().values().cloned().collect())
    }

    async fn get_primary(&self) -> CoreResult<Option<MasterKey>> {
        Ok(self.rows.read().unwrap().values().find(|k| k.is_primary).cloned())
    }

    async fn set_primary(&self, name: &str) -> CoreResult<()> {
        let mut rows = self.rows.write().unwrap();
        for (row_name, row) in rows.iter_mut() {
            row.is_primary = row_name == name;
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> CoreResult<()> {
        self.rows.write().unwrap().remove(name);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryOrgKeyRepository {
    rows: RwLock<HashMap<String, OrgKey>>,
}

#[async_trait]
impl OrgKeyRepository for InMemoryOrgKeyRepository {
    async fn get(&self, org_id: &str) -> CoreResult<Option<OrgKey>> {
        Ok(self.rows.read().unwrap().get(org_id).cloned())
    }

    async fn upsert(&self, org_key: OrgKey) -> CoreResult<()> {
        self.rows.write().unwrap().insert(org_key.org_id.clone(), org_key);
        Ok(())
    }

    async fn list_all(&self) -> CoreResult<Vec<OrgKey>> {
        Ok(self.rows.read().unwrap().values().cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemorySecretEntryRepository {
    rows: RwLock<HashMap<(String, String, String), SecretEntry>>,
}

#[async_trait]
impl SecretEntryRepository for InMemorySecretEntryRepository {
    async fn get(&self, org_id: &str, path: &str, key: &str) -> CoreResult<Option<SecretEntry>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .get(&(org_id.to_string(), path.to_string(), key.to_string()))
            .cloned())
    }

    async fn set(&self, entry: SecretEntry) -> CoreResult<()> {
        self.rows
            .write()
            .unwrap()
            .insert((entry.org_id.clone(), entry.path.clone(), entry.key.clone()), entry);
        Ok(())
    }

    async fn delete(&self, org_id: &str, path: &str, key: &str) -> CoreResult<bool> {
        Ok(self
            .rows
            .write()
            .unwrap()
            .remove(&(org_id.to_string(), path.to_string(), key.to_string()))
            .is_some())
    }

    async fn list_keys(&self, org_id: &str, path: &str) -> CoreResult<Vec<String>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .keys()
            .filter(|(o, p, _)| o == org_id && p == path)
            .map(|(_, _, k)| k.clone())
            .collect())
    }

    async fn list_paths(&self, org_id: &str) -> CoreResult<Vec<String>> {
        let mut paths: Vec<String> = self
            .rows
            .read()
            .unwrap()
            .keys()
            .filter(|(o, _, _)| o == org_id)
            .map(|(_, p, _)| p.clone())
            .collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}

/// An API token row, scoped to a user, with an `is_admin` flag gating the
/// `/api/v1/admin/*` surface.
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub token: String,
    pub user_id: String,
    pub is_admin: bool,
}

#[derive(Default)]
pub struct InMemoryTokenStore {
    rows: RwLock<HashMap<String, ApiToken>>,
}

impl InMemoryTokenStore {
    pub fn insert(&self, token: ApiToken) {
        self.rows.write().unwrap().insert(token.token.clone(), token);
    }

    pub fn lookup(&self, token: &str) -> Option<ApiToken> {
        self.rows.read().unwrap().get(token).cloned()
    }

    pub fn delete(&self, token: &str) -> bool {
        self.rows.write().unwrap().remove(token).is_some()
    }

    pub fn list(&self) -> Vec<ApiToken> {
        self.rows.read().unwrap().values().cloned().collect()
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
