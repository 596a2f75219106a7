//! Persisted account settings and error definitions.

use std::collections::BTreeMap;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Account and contract bookkeeping for one workspace.
///
/// Field names match the settings written by earlier versions of the tool,
/// which stored the encrypted key under `privateKey`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    /// Public address of the active account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    /// Persisted `EncryptedSecret` string.
    #[serde(rename = "privateKey", skip_serializing_if = "Option::is_none")]
    pub encrypted_key: Option<String>,

    /// Deployed contract addresses by contract key (`File.sol:Contract`).
    pub contracts: BTreeMap<String, Address>,

    /// Keys this tool does not manage (e.g. `host`), written back unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AccountSettings {
    /// The account pair, if both halves are present.
    ///
    /// An address without a key (or the reverse) counts as uninitialized.
    pub fn account(&self) -> Option<(Address, &str)> {
        match (self.address, self.encrypted_key.as_deref()) {
            (Some(address), Some(key)) if !key.is_empty() => Some((address, key)),
            _ => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.account().is_some()
    }

    /// Deployed address recorded for `contract_key`.
    pub fn contract(&self, contract_key: &str) -> Option<Address> {
        self.contracts.get(contract_key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_initialized_account_is_fresh() {
        let mut settings = AccountSettings {
            address: Some(Address::ZERO),
            ..Default::default()
        };
        assert!(!settings.is_initialized());

        settings.address = None;
        settings.encrypted_key = Some("abcd".into());
        assert!(!settings.is_initialized());

        settings.address = Some(Address::ZERO);
        assert!(settings.is_initialized());
    }

    #[test]
    fn test_legacy_field_names() {
        let json = r#"{
            "address": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "privateKey": "00ff",
            "host": "https://ropsten.infura.io/",
            "contracts": { "Token.sol:Token": "0x500386e27ce708f37095a7b7ffcef7c36c1c1bd6" }
        }"#;
        let settings: AccountSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.encrypted_key.as_deref(), Some("00ff"));
        assert!(settings.contract("Token.sol:Token").is_some());

        let out = serde_json::to_string(&settings).unwrap();
        assert!(out.contains("\"privateKey\""));
    }

    #[test]
    fn test_unmanaged_keys_survive_save() {
        let json = r#"{
            "address": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "privateKey": "00ff",
            "host": "https://ropsten.infura.io/"
        }"#;
        let mut settings: AccountSettings = serde_json::from_str(json).unwrap();
        assert_eq!(
            settings.extra.get("host"),
            Some(&serde_json::Value::from("https://ropsten.infura.io/"))
        );
        assert!(!settings.extra.contains_key("privateKey"));

        settings.encrypted_key = Some("aa55".into());
        let saved: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&settings).unwrap()).unwrap();
        assert_eq!(saved["host"], "https://ropsten.infura.io/");
        assert_eq!(saved["privateKey"], "aa55");
    }
}
