//! Process-lifetime cache of unlocked keys.

use std::sync::Arc;

use dashmap::DashMap;

use crate::settings::AccountSettings;
use crate::vault::types::PlaintextKey;

/// What the cache knows about the account in a settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// This exact encrypted value was unlocked before.
    Hit(PlaintextKey),
    /// The account exists but this encrypted value has not been unlocked.
    NeedsUnlock,
    /// No complete account in settings.
    NeedsAccount,
}

/// Map from a persisted encrypted-key string to its plaintext key.
///
/// Keyed by value: when settings switch to a different encrypted key the old
/// entry is simply never looked up again. Nothing is ever written to disk.
#[derive(Debug, Default, Clone)]
pub struct CredentialCache {
    entries: Arc<DashMap<String, PlaintextKey>>,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, settings: &AccountSettings) -> CacheLookup {
        match settings.account() {
            None => CacheLookup::NeedsAccount,
            Some((_, encrypted_key)) => match self.entries.get(encrypted_key) {
                Some(entry) => CacheLookup::Hit(entry.value().clone()),
                None => CacheLookup::NeedsUnlock,
            },
        }
    }

    pub fn remember(&self, encrypted_key: &str, key: PlaintextKey) {
        self.entries.insert(encrypted_key.to_string(), key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
