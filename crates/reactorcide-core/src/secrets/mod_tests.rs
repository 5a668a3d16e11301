use super::master_key::{MasterKey, MasterKeyManager, MasterKeyRepository};
use super::*;
use std::sync::Mutex;

#[derive(Default)]
struct InMemoryMasterKeys {
    rows: Mutex<HashMap<String, MasterKey>>,
}

#[async_trait]
impl MasterKeyRepository for InMemoryMasterKeys {
    async fn insert(&self, key: MasterKey) -> CoreResult<MasterKey> {
        self.rows.lock().unwrap().insert(key.name.clone(), key.clone());
        Ok(key)
    }
    async fn get_by_name(&self, name: &str) -> CoreResult<Option<MasterKey>> {
        Ok(self.rows.lock().unwrap().get(name).cloned())
    }
    async fn list(&self) -> CoreResult<Vec<MasterKey>> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }
    async fn get_primary(&self) -> CoreResult<Option<MasterKey>> {
        Ok(self.rows.lock().unwrap().values().find(|k| k.is_primary).cloned())
    }
    async fn set_primary(&self, name: &str) -> CoreResult<()> {
        let mut rows = self.rows.lock().unwrap();
        for (row_name, row) in rows.iter_mut() {
            row.is_primary = row_name == name;
        }
        Ok(())
    }
    async fn delete(&self, name: &str) -> CoreResult<()> {
        self.rows.lock().unwrap().remove(name);
        Ok(())
    }
}

#[derive(Default)]
struct InMemoryOrgKeys {
    rows: Mutex<HashMap<String, OrgKey>>,
}

#[async_trait]
impl OrgKeyRepository for InMemoryOrgKeys {
    async fn get(&self, org_id: &str) -> CoreResult<Option<OrgKey>> {
        Ok(self.rows.lock().unwrap().get(org_id).cloned())
    }
    async fn upsert(&self, org_key: OrgKey) -> CoreResult<()> {
        self.rows.lock().unwrap().insert(org_key.org_id.clone(), org_key);
        Ok(())
    }
    async fn list_all(&self) -> CoreResult<Vec<OrgKey>> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }
}

#[derive(Default)]
struct InMemorySecretEntries {
    rows: Mutex<HashMap<(String, String, String), SecretEntry>>,
}

#[async_trait]
impl SecretEntryRepository for InMemorySecretEntries {
    async fn get(&self, org_id: &str, path: &str, key: &str) -> CoreResult<Option<SecretEntry>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&(org_id.to_string(), path.to_string(), key.to_string()))
            .cloned())
    }
    async fn set(&self, entry: SecretEntry) -> CoreResult<()> {
        self.rows
            .lock()
            .unwrap()
            .insert((entry.org_id.clone(), entry.path.clone(), entry.key.clone()), entry);
        Ok(())
    }
    async fn delete(&self, org_id: &str, path: &str, key: &str) -> CoreResult<bool> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .remove(&(org_id.to_string(), path.to_string(), key.to_string()))
            .is_some())
    }
    async fn list_keys(&self, org_id: &str, path: &str) -> CoreResult<Vec<String>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .keys()
            .filter(|(o, p, _)| o == org_id && p == path)
            .map(|(_, _, k)| k.clone())
            .collect())
    }
    async fn list_paths(&self, org_id: &str) -> CoreResult<Vec<String>> {
        let mut paths: Vec<String> = self
            .rows
            .lock()
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

fn test_store() -> SecretStore<InMemoryMasterKeys, InMemoryOrgKeys, InMemorySecretEntries> {
    let mut env = HashMap::new();
    env.insert("k1".to_string(), generate_dek());
    env.insert("k2".to_string(), generate_dek());
    let manager = MasterKeyManager::new(InMemoryMasterKeys::default(), env);
    SecretStore::new(manager, InMemoryOrgKeys::default(), InMemorySecretEntries::default())
}

#[tokio::test]
async fn round_trip_set_then_get() {
    let store = test_store();
    store.master_keys.register("k1", "primary").await.unwrap();
    store.initialize_org("org-a").await.unwrap();

    store.set("org-a", "ci/tokens", "gh", "ghp_abc").await.unwrap();
    assert_eq!(store.get("org-a", "ci/tokens", "gh").await.unwrap(), "ghp_abc");
}

#[tokio::test]
async fn get_on_missing_entry_is_empty_string_not_error() {
    let store = test_store();
    store.master_keys.register("k1", "primary").await.unwrap();
    store.initialize_org("org-a").await.unwrap();
    assert_eq!(store.get("org-a", "ci/tokens", "missing").await.unwrap(), "");
}

#[tokio::test]
async fn get_without_initialized_org_is_precondition_failed() {
    let store = test_store();
    store.master_keys.register("k1", "primary").await.unwrap();
    let err = store.get("org-a", "ci/tokens", "gh").await.unwrap_err();
    assert!(matches!(err, CoreError::PreconditionFailed(_)));
}

#[tokio::test]
async fn initialize_org_twice_fails() {
    let store = test_store();
    store.master_keys.register("k1", "primary").await.unwrap();
    store.initialize_org("org-a").await.unwrap();
    let err = store.initialize_org("org-a").await.unwrap_err();
    assert!(matches!(err, CoreError::AlreadyExists(_)));
}

#[tokio::test]
async fn rejects_invalid_path_and_key() {
    let store = test_store();
    store.master_keys.register("k1", "primary").await.unwrap();
    store.initialize_org("org-a").await.unwrap();

    assert!(matches!(
        store.set("org-a", "../escape", "gh", "x").await.unwrap_err(),
        CoreError::InvalidPath(_)
    ));
    assert!(matches!(
        store.set("org-a", "ci", "bad key!", "x").await.unwrap_err(),
        CoreError::InvalidKey(_)
    ));
    assert!(matches!(
        store.set("org-a", "/leading", "gh", "x").await.unwrap_err(),
        CoreError::InvalidPath(_)
    ));
}

#[tokio::test]
async fn rotation_preserves_values_and_updates_wrapping_key() {
    let store = test_store();
    store.master_keys.register("k1", "primary").await.unwrap();
    store.master_keys.register("k2", "secondary").await.unwrap();
    store.initialize_org("org-a").await.unwrap();
    store.set("org-a", "ci/tokens", "gh", "ghp_abc").await.unwrap();

    let failed = store.rotate_to("k2").await.unwrap();
    assert!(failed.is_empty());

    assert_eq!(store.get("org-a", "ci/tokens", "gh").await.unwrap(), "ghp_abc");
    let org_key = store.org_keys.get("org-a").await.unwrap().unwrap();
    assert_eq!(org_key.wrapping_master_key_name, "k2");
}

#[tokio::test]
async fn rotate_to_promotes_new_key_to_primary() {
    let store = test_store();
    store.master_keys.register("k1", "primary").await.unwrap();
    store.master_keys.register("k2", "secondary").await.unwrap();
    store.initialize_org("org-a").await.unwrap();
    store.rotate_to("k2").await.unwrap();

    // k2 is now primary, so decommissioning it fails; k1, no longer
    // primary and no longer referenced by any org key, can be retired.
    store.master_keys.decommission("k1", false).await.unwrap();
    let err = store.master_keys.decommission("k2", false).await.unwrap_err();
    assert!(matches!(err, CoreError::CannotDecommissionPrimary));
}

#[tokio::test]
async fn get_multi_returns_values_keyed_by_reference() {
    let store = test_store();
    store.master_keys.register("k1", "primary").await.unwrap();
    store.initialize_org("org-a").await.unwrap();
    store.set("org-a", "ci/tokens", "gh", "ghp_abc").await.unwrap();

    let refs = vec![("ci/tokens".to_string(), "gh".to_string())];
    let values = store.get_multi("org-a", &refs).await.unwrap();
    assert_eq!(values.get("ci/tokens:gh").unwrap(), "ghp_abc");
}

#[test]
fn parse_secret_ref_splits_on_first_colon() {
    assert_eq!(
        parse_secret_ref("ci/tokens:gh"),
        Some(("ci/tokens".to_string(), "gh".to_string()))
    );
}

#[test]
fn parse_secret_ref_is_none_for_malformed_input() {
    assert_eq!(parse_secret_ref("no-colon"), None);
    assert_eq!(parse_secret_ref(":missing-path"), None);
    assert_eq!(parse_secret_ref("missing-key:"), None);
    assert_eq!(parse_secret_ref(""), None);
}
