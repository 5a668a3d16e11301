//! # Master Key Registry
//!
//! Named 32-byte keys provisioned out-of-band (via the `MASTER_KEYS`
//! environment map) and mirrored in a database registry. Exactly one key is
//! primary at a time; the primary's bytes must be present in the process
//! environment for the process to decrypt anything.

use crate::secrets::crypto::DEK_LEN;
use crate::{CoreError, CoreResult, Timestamp};
use async_trait::async_trait;
use std::collections::HashMap;

/// A named master key row, as mirrored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterKey {
    pub name: String,
    pub key_id: String,
    pub is_primary: bool,
    pub is_active: bool,
    pub description: String,
    pub created_at: Timestamp,
}

/// Persistence contract for master key rows. The relational implementation
/// is out of scope for this crate.
#[async_trait]
pub trait MasterKeyRepository: Send + Sync {
    async fn insert(&self, key: MasterKey) -> CoreResult<MasterKey>;
    async fn get_by_name(&self, name: &str) -> CoreResult<Option<MasterKey>>;
    async fn list(&self) -> CoreResult<Vec<MasterKey>>;
    async fn get_primary(&self) -> CoreResult<Option<MasterKey>>;
    /// Atomically clear `is_primary` on every row and set it on `name`.
    async fn set_primary(&self, name: &str) -> CoreResult<()>;
    async fn delete(&self, name: &str) -> CoreResult<()>;
}

/// Parse the `MASTER_KEYS` environment variable: comma-separated
/// `name:base64-32-bytes` entries.
///
/// # Errors
///
/// Returns [`CoreError::Internal`] if any entry is malformed or does not
/// decode to exactly 32 bytes.
pub fn parse_master_keys_env(raw: &str) -> CoreResult<HashMap<String, [u8; DEK_LEN]>> {
    use base64::{engine::general_purpose::STANDARD, Engine};

    let mut out = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, b64) = entry.split_once(':').ok_or_else(|| {
            CoreError::Internal(format!("MASTER_KEYS entry '{entry}' missing ':' separator"))
        })?;

        let bytes = STANDARD
            .decode(b64)
            .map_err(|_| CoreError::Internal(format!("MASTER_KEYS entry '{name}' is not valid base64")))?;

        let key: [u8; DEK_LEN] = bytes.try_into().map_err(|_| {
            CoreError::Internal(format!("MASTER_KEYS entry '{name}' is not {DEK_LEN} bytes"))
        })?;

        out.insert(name.to_string(), key);
    }
    Ok(out)
}

/// The in-process master-key manager: the environment-provided key bytes
/// plus the database registry of named keys. The environment map itself is
/// fixed at construction — every key an operator intends to rotate to or
/// decommission must already be present in `MASTER_KEYS` at startup, since
/// [`SecretStore::rotate_to`](crate::secrets::SecretStore::rotate_to) only
/// promotes a key's `is_primary` row, it never adds bytes to this map.
pub struct MasterKeyManager<R: MasterKeyRepository> {
    repo: R,
    env_keys: HashMap<String, [u8; DEK_LEN]>,
}

impl<R: MasterKeyRepository> MasterKeyManager<R> {
    pub fn new(repo: R, env_keys: HashMap<String, [u8; DEK_LEN]>) -> Self {
        Self { repo, env_keys }
    }

    /// Resolve the bytes for a named master key from the environment map.
    pub fn key_bytes(&self, name: &str) -> Option<&[u8; DEK_LEN]> {
        self.env_keys.get(name)
    }

    /// List every registered master key row.
    pub async fn list(&self) -> CoreResult<Vec<MasterKey>> {
        self.repo.list().await
    }

    /// Resolve the current primary key's name and bytes, choosing it by the
    /// `is_primary` flag in the database, cross-referenced against the
    /// environment map. If the database has no primary row and exactly one
    /// key is configured in the environment, a primary row is materialized
    /// for it.
    pub async fn primary(&self) -> CoreResult<(String, [u8; DEK_LEN])> {
        if let Some(row) = self.repo.get_primary().await? {
            let bytes = self.key_bytes(&row.name).ok_or_else(|| {
                CoreError::ServiceUnavailable(format!(
                    "primary master key '{}' is not present in the environment",
                    row.name
                ))
            })?;
            return Ok((row.name, *bytes));
        }

        if self.env_keys.len() == 1 {
            let (name, bytes) = self.env_keys.iter().next().unwrap();
            self.register(name, "auto-materialized primary").await?;
            self.repo.set_primary(name).await?;
            return Ok((name.clone(), *bytes));
        }

        Err(CoreError::ServiceUnavailable(
            "no primary master key configured".to_string(),
        ))
    }

    /// `register(name, description)` — insert a [`MasterKey`] row.
    ///
    /// # Errors
    ///
    /// [`CoreError::AlreadyExists`] if `name` is not present in the
    /// environment map at all — an operator cannot register a key whose
    /// bytes were never provisioned.
    pub async fn register(&self, name: &str, description: &str) -> CoreResult<MasterKey> {
        if !self.env_keys.contains_key(name) {
            return Err(CoreError::AlreadyExists(format!(
                "master key '{name}' is not present in the MASTER_KEYS environment map"
            )));
        }

        if self.repo.get_by_name(name).await?.is_some() {
            return Err(CoreError::AlreadyExists(format!("master key '{name}' already registered")));
        }

        let is_primary = self.repo.get_primary().await?.is_none();
        self.repo
            .insert(MasterKey {
                name: name.to_string(),
                key_id: uuid::Uuid::new_v4().to_string(),
                is_primary,
                is_active: true,
                description: description.to_string(),
                created_at: Timestamp::now(),
            })
            .await
    }

    /// `decommission(name)` — remove a master key row.
    ///
    /// # Errors
    ///
    /// [`CoreError::CannotDecommissionPrimary`] if `name` is the current
    /// primary. Refuses (as [`CoreError::PreconditionFailed`]) if any
    /// [`crate::secrets::OrgKey`] row still wraps with it — operators must
    /// rotate first.
    pub async fn decommission(&self, name: &str, org_keys_reference_it: bool) -> CoreResult<()> {
        let row = self
            .repo
            .get_by_name(name)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("master key '{name}' not found")))?;

        if row.is_primary {
            return Err(CoreError::CannotDecommissionPrimary);
        }

        if org_keys_reference_it {
            return Err(CoreError::PreconditionFailed(format!(
                "org keys still wrap with '{name}'; rotate them first"
            )));
        }

        self.repo.delete(name).await
    }

    /// Promote `name` to primary in the database registry. Called by
    /// [`crate::secrets::SecretStore::rotate_to`] once every Org Key row has
    /// been rewrapped, so that the key used to seal *new* data always
    /// matches the key used to seal the rotated tenant data.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFound`] if `name` is not a registered master key.
    pub async fn promote_primary(&self, name: &str) -> CoreResult<()> {
        self.repo
            .get_by_name(name)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("master key '{name}' not found")))?;
        self.repo.set_primary(name).await
    }

    /// `sync_primary()` — reconcile the `is_primary` flag with the
    /// environment configuration. A no-op if the database already agrees
    /// with the environment, or if there is no unambiguous primary to adopt.
    pub async fn sync_primary(&self) -> CoreResult<()> {
        if self.repo.get_primary().await?.is_some() {
            return Ok(());
        }
        if self.env_keys.len() == 1 {
            let name = self.env_keys.keys().next().unwrap();
            if self.repo.get_by_name(name).await?.is_none() {
                self.register(name, "synced from environment").await?;
            }
            self.repo.set_primary(name).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "master_key_tests.rs"]
mod tests;
