//! # Secret Store
//!
//! Envelope-encrypted per-tenant key/value storage used to hold webhook
//! secrets and VCS tokens. Two AEAD layers: a per-org 256-bit DEK sealed
//! with the current primary master key (the [`master_key`] module), and
//! each secret value sealed with that DEK. See `crypto` for the AEAD
//! primitives and `master_key` for key rotation and decommissioning.

pub mod crypto;
pub mod master_key;

use crate::secrets::crypto::{generate_dek, open, seal, CryptoError, DEK_LEN};
use crate::secrets::master_key::{MasterKeyManager, MasterKeyRepository};
use crate::{CoreError, CoreResult, Timestamp};
use async_trait::async_trait;
use std::collections::HashMap;

/// A per-tenant data-encryption key, sealed with the current primary master
/// key at the time it was created or last rotated.
#[derive(Debug, Clone)]
pub struct OrgKey {
    pub org_id: String,
    pub encrypted_dek: String,
    pub wrapping_master_key_name: String,
    pub created_at: Timestamp,
}

/// A leaf value in the tenant KV, scoped by `(org_id, path, key)`.
#[derive(Debug, Clone)]
pub struct SecretEntry {
    pub org_id: String,
    pub path: String,
    pub key: String,
    pub ciphertext: String,
    /// Reserved for future per-org DEK versioning; every entry written by
    /// this implementation references version 1, since a master-key
    /// rotation rewraps the existing DEK in place rather than minting a new
    /// one (see DESIGN.md for the open-question resolution).
    pub wrapping_org_key_version: u32,
}

#[async_trait]
pub trait OrgKeyRepository: Send + Sync {
    async fn get(&self, org_id: &str) -> CoreResult<Option<OrgKey>>;
    async fn upsert(&self, org_key: OrgKey) -> CoreResult<()>;
    async fn list_all(&self) -> CoreResult<Vec<OrgKey>>;
}

#[async_trait]
pub trait SecretEntryRepository: Send + Sync {
    async fn get(&self, org_id: &str, path: &str, key: &str) -> CoreResult<Option<SecretEntry>>;
    async fn set(&self, entry: SecretEntry) -> CoreResult<()>;
    async fn delete(&self, org_id: &str, path: &str, key: &str) -> CoreResult<bool>;
    async fn list_keys(&self, org_id: &str, path: &str) -> CoreResult<Vec<String>>;
    async fn list_paths(&self, org_id: &str) -> CoreResult<Vec<String>>;
}

/// Validate a `path` or `key` component: `[A-Za-z0-9_./-]+`, no `..`
/// segments, no leading `/`, bounded length.
fn validate_component(value: &str, field: &str, err: impl Fn(String) -> CoreError) -> CoreResult<()> {
    const MAX_LEN: usize = 512;

    if value.is_empty() || value.len() > MAX_LEN {
        return Err(err(format!("{field} must be 1-{MAX_LEN} characters")));
    }
    if value.starts_with('/') {
        return Err(err(format!("{field} must not start with '/'")));
    }
    if value.split('/').any(|segment| segment == "..") {
        return Err(err(format!("{field} must not contain '..' segments")));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || "_./-".contains(c)) {
        return Err(err(format!(
            "{field} must match [A-Za-z0-9_./-]+"
        )));
    }
    Ok(())
}

fn validate_path(path: &str) -> CoreResult<()> {
    validate_component(path, "path", CoreError::InvalidPath)
}

fn validate_key(key: &str) -> CoreResult<()> {
    validate_component(key, "key", CoreError::InvalidKey)
}

/// The envelope-encrypted secret store.
pub struct SecretStore<MK, OK, SE>
where
    MK: MasterKeyRepository,
    OK: OrgKeyRepository,
    SE: SecretEntryRepository,
{
    pub master_keys: MasterKeyManager<MK>,
    org_keys: OK,
    entries: SE,
}

impl<MK, OK, SE> SecretStore<MK, OK, SE>
where
    MK: MasterKeyRepository,
    OK: OrgKeyRepository,
    SE: SecretEntryRepository,
{
    pub fn new(master_keys: MasterKeyManager<MK>, org_keys: OK, entries: SE) -> Self {
        Self { master_keys, org_keys, entries }
    }

    /// Generate a DEK for `org_id`, seal it with the current primary master
    /// key, and insert the Org Key row.
    ///
    /// # Errors
    ///
    /// [`CoreError::AlreadyExists`] ("AlreadyInitialized") if the org
    /// already has a Org Key row.
    pub async fn initialize_org(&self, org_id: &str) -> CoreResult<()> {
        if self.org_keys.get(org_id).await?.is_some() {
            return Err(CoreError::AlreadyExists(format!("org '{org_id}' already initialized")));
        }

        let (primary_name, primary_bytes) = self.master_keys.primary().await?;
        let dek = generate_dek();
        let encrypted_dek = seal(&primary_bytes, &dek).map_err(crypto_err)?;

        self.org_keys
            .upsert(OrgKey {
                org_id: org_id.to_string(),
                encrypted_dek,
                wrapping_master_key_name: primary_name,
                created_at: Timestamp::now(),
            })
            .await
    }

    async fn org_dek(&self, org_id: &str) -> CoreResult<[u8; DEK_LEN]> {
        let org_key = self
            .org_keys
            .get(org_id)
            .await?
            .ok_or_else(|| CoreError::PreconditionFailed(format!("org '{org_id}' has no secrets initialized")))?;

        let wrapping_bytes = self
            .master_keys
            .key_bytes(&org_key.wrapping_master_key_name)
            .ok_or_else(|| {
                CoreError::ServiceUnavailable(format!(
                    "wrapping master key '{}' is not present in the environment",
                    org_key.wrapping_master_key_name
                ))
            })?;

        let dek_bytes = open(wrapping_bytes, &org_key.encrypted_dek).map_err(crypto_err)?;
        dek_bytes
            .try_into()
            .map_err(|_| CoreError::Internal("decrypted DEK is not 32 bytes".to_string()))
    }

    /// `get(path, key) → value | ""`. Validation runs before any crypto;
    /// a missing entry or a decryption failure both surface as an empty
    /// string, matching the "no secret configured" contract callers rely on.
    pub async fn get(&self, org_id: &str, path: &str, key: &str) -> CoreResult<String> {
        validate_path(path)?;
        validate_key(key)?;

        let Some(entry) = self.entries.get(org_id, path, key).await? else {
            return Ok(String::new());
        };

        let dek = self.org_dek(org_id).await?;
        match open(&dek, &entry.ciphertext) {
            Ok(plaintext) => Ok(String::from_utf8(plaintext).unwrap_or_default()),
            Err(_) => Ok(String::new()),
        }
    }

    pub async fn set(&self, org_id: &str, path: &str, key: &str, value: &str) -> CoreResult<()> {
        validate_path(path)?;
        validate_key(key)?;

        let dek = self.org_dek(org_id).await?;
        let ciphertext = seal(&dek, value.as_bytes()).map_err(crypto_err)?;

        self.entries
            .set(SecretEntry {
                org_id: org_id.to_string(),
                path: path.to_string(),
                key: key.to_string(),
                ciphertext,
                wrapping_org_key_version: 1,
            })
            .await
    }

    pub async fn delete(&self, org_id: &str, path: &str, key: &str) -> CoreResult<bool> {
        validate_path(path)?;
        validate_key(key)?;
        self.entries.delete(org_id, path, key).await
    }

    pub async fn list_keys(&self, org_id: &str, path: &str) -> CoreResult<Vec<String>> {
        validate_path(path)?;
        self.entries.list_keys(org_id, path).await
    }

    pub async fn list_paths(&self, org_id: &str) -> CoreResult<Vec<String>> {
        self.entries.list_paths(org_id).await
    }

    pub async fn get_multi(
        &self,
        org_id: &str,
        refs: &[(String, String)],
    ) -> CoreResult<HashMap<String, String>> {
        let mut out = HashMap::with_capacity(refs.len());
        for (path, key) in refs {
            let value = self.get(org_id, path, key).await?;
            out.insert(format!("{path}:{key}"), value);
        }
        Ok(out)
    }

    /// `true` iff any Org Key row still wraps its DEK with `name`. Used by
    /// the decommissioning flow to refuse removing a master key operators
    /// have not finished rotating away from.
    pub async fn master_key_is_referenced(&self, name: &str) -> CoreResult<bool> {
        Ok(self.org_keys.list_all().await?.iter().any(|org_key| org_key.wrapping_master_key_name == name))
    }

    /// For every Org Key row, decrypt the DEK with its current wrapping
    /// master key and re-encrypt with `name`. Idempotent per row: a row
    /// already wrapped with `name` is rewritten with a fresh seal (new
    /// nonce) but otherwise left semantically unchanged, so a restart after
    /// a partial failure safely resumes rather than double-wrapping.
    ///
    /// Once rotation completes (even partially — see above), `name` is
    /// promoted to primary so that newly sealed data uses the same key as
    /// the rotated tenant data.
    ///
    /// Returns the org IDs that failed to rotate; already-rewrapped rows
    /// stay valid under the new key regardless of later failures.
    pub async fn rotate_to(&self, name: &str) -> CoreResult<Vec<String>> {
        let new_bytes = *self
            .master_keys
            .key_bytes(name)
            .ok_or_else(|| CoreError::NotFound(format!("master key '{name}' is not registered")))?;

        let mut failed = Vec::new();
        for org_key in self.org_keys.list_all().await? {
            if let Err(_err) = self.rotate_one(&org_key, name, &new_bytes).await {
                failed.push(org_key.org_id);
            }
        }
        self.master_keys.promote_primary(name).await?;
        Ok(failed)
    }

    async fn rotate_one(&self, org_key: &OrgKey, new_name: &str, new_bytes: &[u8; DEK_LEN]) -> CoreResult<()> {
        let old_bytes = self
            .master_keys
            .key_bytes(&org_key.wrapping_master_key_name)
            .ok_or_else(|| {
                CoreError::ServiceUnavailable(format!(
                    "wrapping master key '{}' is not present in the environment",
                    org_key.wrapping_master_key_name
                ))
            })?;

        let dek = open(old_bytes, &org_key.encrypted_dek).map_err(crypto_err)?;
        let re_sealed = seal(new_bytes, &dek).map_err(crypto_err)?;

        self.org_keys
            .upsert(OrgKey {
                org_id: org_key.org_id.clone(),
                encrypted_dek: re_sealed,
                wrapping_master_key_name: new_name.to_string(),
                created_at: org_key.created_at,
            })
            .await
    }
}

fn crypto_err(e: CryptoError) -> CoreError {
    CoreError::Internal(format!("secret crypto failure: {e}"))
}

/// Split a `<path>:<key>` reference on the first `:`. Missing or malformed
/// references (no `:`, empty components) are reported as `None`; callers
/// must treat that as "no secret configured" rather than erroring.
pub fn parse_secret_ref(reference: &str) -> Option<(String, String)> {
    let (path, key) = reference.split_once(':')?;
    if path.is_empty() || key.is_empty() {
        return None;
    }
    Some((path.to_string(), key.to_string()))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
