//! Serialized access to persisted settings.

use std::fmt;
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::Mutex;

use crate::settings::store::SettingsStore;
use crate::settings::types::{AccountSettings, SettingsResult};
use crate::vault::EncryptedSecret;

/// Front door to the settings store.
///
/// Updates are read-modify-write against the latest snapshot and run one at
/// a time in FIFO order, so two deploys finishing together both keep their
/// contract records.
#[derive(Clone)]
pub struct SettingsGateway {
    store: Arc<dyn SettingsStore>,
    queue: Arc<Mutex<()>>,
}

impl SettingsGateway {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            queue: Arc::new(Mutex::new(())),
        }
    }

    /// Current snapshot.
    pub async fn load(&self) -> SettingsResult<AccountSettings> {
        self.store.load().await
    }

    /// Apply `change` to the latest snapshot and save it.
    pub async fn update<F>(&self, change: F) -> SettingsResult<AccountSettings>
    where
        F: FnOnce(&mut AccountSettings) + Send,
    {
        let _turn = self.queue.lock().await;
        let mut settings = self.store.load().await?;
        change(&mut settings);
        self.store.save(&settings).await?;
        Ok(settings)
    }

    /// Store a new account. Address and key are always written together.
    pub async fn set_account(
        &self,
        address: Address,
        secret: &EncryptedSecret,
    ) -> SettingsResult<AccountSettings> {
        let encoded = secret.to_hex();
        let settings = self
            .update(move |s| {
                s.address = Some(address);
                s.encrypted_key = Some(encoded);
            })
            .await?;

        tracing::info!(address = %address, "Account saved to settings");
        Ok(settings)
    }

    /// Record where `contract_key` was deployed.
    pub async fn record_contract(
        &self,
        contract_key: &str,
        address: Address,
    ) -> SettingsResult<AccountSettings> {
        let key = contract_key.to_string();
        let settings = self
            .update(move |s| {
                s.contracts.insert(key, address);
            })
            .await?;

        tracing::info!(contract = contract_key, address = %address, "Contract address recorded");
        Ok(settings)
    }
}

impl fmt::Debug for SettingsGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsGateway").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::store::{JsonFileSettingsStore, MemorySettingsStore};

    #[tokio::test]
    async fn test_concurrent_records_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileSettingsStore::new(dir.path().join("settings.json")));
        let gateway = SettingsGateway::new(store);

        let mut tasks = Vec::new();
        for i in 0..16u8 {
            let gateway = gateway.clone();
            tasks.push(tokio::spawn(async move {
                gateway
                    .record_contract(&format!("C{i}.sol:C{i}"), Address::repeat_byte(i))
                    .await
                    .unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let settings = gateway.load().await.unwrap();
        assert_eq!(settings.contracts.len(), 16);
        assert_eq!(settings.contract("C3.sol:C3"), Some(Address::repeat_byte(3)));
    }

    #[tokio::test]
    async fn test_set_account_keeps_contracts() {
        let mut initial = AccountSettings::default();
        initial.contracts.insert("A.sol:A".into(), Address::ZERO);
        let gateway = SettingsGateway::new(Arc::new(MemorySettingsStore::new(initial)));

        let secret = EncryptedSecret::new(vec![1, 2, 3], [7; 32]);
        let settings = gateway
            .set_account(Address::repeat_byte(1), &secret)
            .await
            .unwrap();

        assert!(settings.is_initialized());
        assert_eq!(settings.encrypted_key, Some(secret.to_hex()));
        assert_eq!(settings.contracts.len(), 1);
    }
}
