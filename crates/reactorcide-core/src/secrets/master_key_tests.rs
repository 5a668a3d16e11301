use super::*;
use std::sync::Mutex;

#[derive(Default)]
struct InMemoryMasterKeyRepository {
    rows: Mutex<HashMap<String, MasterKey>>,
}

#[async_trait::async_trait]
impl MasterKeyRepository for InMemoryMasterKeyRepository {
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

fn env_with(names: &[&str]) -> HashMap<String, [u8; DEK_LEN]> {
    names
        .iter()
        .map(|n| (n.to_string(), crate::secrets::crypto::generate_dek()))
        .collect()
}

#[test]
fn parses_master_keys_env() {
    use base64::Engine;
    let k1 = base64::engine::general_purpose::STANDARD.encode([7u8; 32]);
    let raw = format!("k1:{k1}");
    let parsed = parse_master_keys_env(&raw).unwrap();
    assert_eq!(parsed.get("k1").unwrap(), &[7u8; 32]);
}

#[test]
fn rejects_env_entry_with_wrong_length() {
    use base64::Engine;
    let short = base64::engine::general_purpose::STANDARD.encode([1u8; 16]);
    assert!(parse_master_keys_env(&format!("k1:{short}")).is_err());
}

#[tokio::test]
async fn register_rejects_name_not_in_environment() {
    let manager = MasterKeyManager::new(InMemoryMasterKeyRepository::default(), env_with(&["k1"]));
    let err = manager.register("k2", "nope").await.unwrap_err();
    assert!(matches!(err, CoreError::AlreadyExists(_)));
}

#[tokio::test]
async fn first_registered_key_becomes_primary() {
    let manager = MasterKeyManager::new(InMemoryMasterKeyRepository::default(), env_with(&["k1"]));
    let row = manager.register("k1", "first").await.unwrap();
    assert!(row.is_primary);
}

#[tokio::test]
async fn single_env_key_auto_materializes_primary_when_db_empty() {
    let manager = MasterKeyManager::new(InMemoryMasterKeyRepository::default(), env_with(&["k1"]));
    let (name, _bytes) = manager.primary().await.unwrap();
    assert_eq!(name, "k1");
}

#[tokio::test]
async fn decommission_primary_always_fails() {
    let manager = MasterKeyManager::new(InMemoryMasterKeyRepository::default(), env_with(&["k1"]));
    manager.register("k1", "").await.unwrap();
    let err = manager.decommission("k1", false).await.unwrap_err();
    assert!(matches!(err, CoreError::CannotDecommissionPrimary));
}

#[tokio::test]
async fn decommission_refuses_while_org_keys_reference_it() {
    let manager = MasterKeyManager::new(InMemoryMasterKeyRepository::default(), env_with(&["k1", "k2"]));
    manager.register("k1", "").await.unwrap();
    manager.register("k2", "").await.unwrap();
    let err = manager.decommission("k2", true).await.unwrap_err();
    assert!(matches!(err, CoreError::PreconditionFailed(_)));
}

#[tokio::test]
async fn decommission_non_primary_with_no_references_succeeds() {
    let manager = MasterKeyManager::new(InMemoryMasterKeyRepository::default(), env_with(&["k1", "k2"]));
    manager.register("k1", "").await.unwrap();
    manager.register("k2", "").await.unwrap();
    manager.decommission("k2", false).await.unwrap();
    assert!(manager.repo.get_by_name("k2").await.unwrap().is_none());
}

#[tokio::test]
async fn sync_primary_is_a_no_op_when_primary_already_set() {
    let manager = MasterKeyManager::new(InMemoryMasterKeyRepository::default(), env_with(&["k1"]));
    manager.register("k1", "").await.unwrap();
    manager.sync_primary().await.unwrap();
    assert_eq!(manager.repo.list().await.unwrap().len(), 1);
}
