//! Session repository for data access
//!
//! Approved grants are stored as JSON under `session:<proposal id>` in the
//! same key-value store that holds the wallet record.

use crate::domain::entities::SessionGrant;
use crate::infrastructure::platform::PlatformStorage;
use crate::shared::constants::SESSION_KEY_PREFIX;
use crate::shared::error::WalletError;
use std::sync::Arc;

pub struct SessionRepository {
    storage: Arc<dyn PlatformStorage>,
}

impl SessionRepository {
    pub fn new(storage: Arc<dyn PlatformStorage>) -> Self {
        Self { storage }
    }

    fn key_for(proposal_id: &str) -> String {
        format!("{}{}", SESSION_KEY_PREFIX, proposal_id)
    }

    pub fn save(&self, grant: &SessionGrant) -> Result<(), WalletError> {
        let json = serde_json::to_string(grant)?;
        self.storage.store(&Self::key_for(&grant.proposal_id), &json)?;
        log::debug!("Persisted session grant {}", grant.proposal_id);
        Ok(())
    }

    pub fn get(&self, proposal_id: &str) -> Result<Option<SessionGrant>, WalletError> {
        match self.storage.retrieve(&Self::key_for(proposal_id))? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// All persisted grants, oldest first
    ///
    /// Entries that no longer parse are skipped with a warning.
    pub fn active_sessions(&self) -> Result<Vec<SessionGrant>, WalletError> {
        let mut grants = vec![];
        for key in self.storage.list_keys()? {
            let Some(proposal_id) = key.strip_prefix(SESSION_KEY_PREFIX) else {
                continue;
            };
            match self.get(proposal_id) {
                Ok(Some(grant)) => grants.push(grant),
                Ok(None) => {}
                Err(e) => log::warn!("Skipping unreadable session {}: {}", proposal_id, e),
            }
        }
        grants.sort_by_key(|g| g.approved_at);
        Ok(grants)
    }

    pub fn forget_session(&self, proposal_id: &str) -> Result<(), WalletError> {
        self.storage.delete(&Self::key_for(proposal_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NamespaceGrant;
    use crate::infrastructure::platform::MemoryStorage;
    use chrono::{Duration, Utc};
    use std::collections::BTreeMap;

    fn grant(id: &str, offset_secs: i64) -> SessionGrant {
        let mut namespaces = BTreeMap::new();
        namespaces.insert(
            "eip155:11155111".to_string(),
            NamespaceGrant {
                accounts: ["eip155:11155111:0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string()].into(),
                methods: ["personal_sign".to_string()].into(),
                events: ["accountsChanged".to_string()].into(),
            },
        );
        SessionGrant {
            proposal_id: id.to_string(),
            namespaces,
            approved_at: Utc::now() + Duration::seconds(offset_secs),
            peer: None,
            pairing_topic: None,
        }
    }

    #[test]
    fn test_active_sessions_survive_corrupt_file_entry() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = Arc::new(
            crate::infrastructure::platform::FileStorage::new(dir.path()).expect("Failed to open file storage"),
        );
        let repository = SessionRepository::new(storage);
        repository.save(&grant("1", 0)).expect("Failed to save grant");
        std::fs::write(dir.path().join("leftover.dat"), "truncated").expect("Failed to write stray file");

        let sessions = repository.active_sessions().expect("Failed to list sessions");
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].proposal_id, "1");
    }

    #[test]
    fn test_save_and_get() {
        let storage = Arc::new(MemoryStorage::new());
        let repository = SessionRepository::new(storage.clone());

        let saved = grant("42", 0);
        repository.save(&saved).expect("Failed to save grant");

        assert!(storage.exists("session:42").expect("exists"));
        assert_eq!(repository.get("42").expect("Failed to load grant"), Some(saved));
        assert_eq!(repository.get("43").expect("Failed to load grant"), None);
    }

    #[test]
    fn test_active_sessions_ignores_wallet_keys_and_corrupt_entries() {
        let storage = Arc::new(MemoryStorage::new());
        storage.store("walletAddress", "0x01").expect("store");
        storage.store("session:broken", "not json").expect("store");

        let repository = SessionRepository::new(storage);
        repository.save(&grant("b", 10)).expect("save");
        repository.save(&grant("a", 0)).expect("save");

        let ids: Vec<String> = repository
            .active_sessions()
            .expect("Failed to list sessions")
            .into_iter()
            .map(|g| g.proposal_id)
            .collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_forget_session() {
        let repository = SessionRepository::new(Arc::new(MemoryStorage::new()));
        repository.save(&grant("1", 0)).expect("save");
        repository.forget_session("1").expect("Failed to forget session");
        assert!(repository.active_sessions().expect("list").is_empty());
    }
}
