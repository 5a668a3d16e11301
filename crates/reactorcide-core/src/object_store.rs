//! # Runner Log Object Store (contract)
//!
//! An opaque blob KV with prefix listing, used to hold runner stdout/stderr
//! streams under `logs/{job_id}/{stream}.json`. The object store
//! implementation itself (S3, Azure Blob, filesystem, ...) is out of scope.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("object store unavailable: {0}")]
    Unavailable(String),
}

/// One structured log line as stored under a stream object key.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LogLine {
    pub timestamp: crate::Timestamp,
    pub stream: String,
    pub level: String,
    pub message: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), ObjectStoreError>;
    async fn list_with_prefix(&self, prefix: &str) -> Result<Vec<String>, ObjectStoreError>;
}

/// Build the object-store key for a job's stdout or stderr stream.
pub fn stream_key(job_id: crate::JobId, stream: &str) -> String {
    format!("logs/{job_id}/{stream}.json")
}

/// Merge-sort two already-sorted stream line lists by timestamp, producing
/// the "combined" view.
pub fn merge_combined(stdout: Vec<LogLine>, stderr: Vec<LogLine>) -> Vec<LogLine> {
    let mut merged = Vec::with_capacity(stdout.len() + stderr.len());
    let mut stdout_iter = stdout.into_iter().peekable();
    let mut stderr_iter = stderr.into_iter().peekable();

    loop {
        match (stdout_iter.peek(), stderr_iter.peek()) {
            (Some(a), Some(b)) => {
                if a.timestamp <= b.timestamp {
                    merged.push(stdout_iter.next().unwrap());
                } else {
                    merged.push(stderr_iter.next().unwrap());
                }
            }
            (Some(_), None) => merged.push(stdout_iter.next().unwrap()),
            (None, Some(_)) => merged.push(stderr_iter.next().unwrap()),
            (None, None) => break,
        }
    }

    merged
}

#[cfg(test)]
#[path = "object_store_tests.rs"]
mod tests;
