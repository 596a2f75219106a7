//! Signing-key resolution: cache first, then the password prompt.

use std::fmt;
use std::sync::Arc;

use alloy::primitives::Address;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::observability::metrics;
use crate::prompt::{PasswordPrompt, PasswordReply};
use crate::settings::{SettingsError, SettingsGateway};
use crate::vault::account::{self, NewAccount};
use crate::vault::cache::{CacheLookup, CredentialCache};
use crate::vault::types::{PlaintextKey, VaultError};

/// Errors while obtaining a usable signing key.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The user dismissed a password prompt.
    #[error("Cancelled")]
    Cancelled,

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Password prompt failed: {0}")]
    Prompt(#[from] std::io::Error),
}

impl CredentialError {
    pub fn is_invalid_password(&self) -> bool {
        matches!(self, Self::Vault(VaultError::InvalidPassword))
    }
}

/// Result type for credential resolution.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Owns the credential cache and the only path that fills it.
#[derive(Clone)]
pub struct Credentials {
    cache: CredentialCache,
    /// Held from settings load until the key is cached or persisted.
    resolving: Arc<Mutex<()>>,
    prompt: Arc<dyn PasswordPrompt>,
    max_unlock_attempts: u32,
}

impl Credentials {
    pub fn new(prompt: Arc<dyn PasswordPrompt>, max_unlock_attempts: u32) -> Self {
        Self {
            cache: CredentialCache::new(),
            resolving: Arc::new(Mutex::new(())),
            prompt,
            max_unlock_attempts: max_unlock_attempts.max(1),
        }
    }

    pub fn cache(&self) -> &CredentialCache {
        &self.cache
    }

    /// Address and plaintext key of the workspace account.
    ///
    /// Creates and persists a new account when settings have none. A wrong
    /// password re-prompts up to `max_unlock_attempts` times; a failed
    /// attempt leaves the cache untouched.
    ///
    /// Concurrent callers resolve one at a time, so a later caller sees the
    /// account an earlier one created instead of creating its own.
    pub async fn signing_key(
        &self,
        gateway: &SettingsGateway,
    ) -> CredentialResult<(Address, PlaintextKey)> {
        let _resolving = self.resolving.lock().await;
        let settings = gateway.load().await?;

        match (self.cache.get(&settings), settings.account()) {
            (CacheLookup::Hit(key), Some((address, _))) => Ok((address, key)),
            (CacheLookup::NeedsUnlock, Some((address, encrypted))) => {
                let key = self.unlock(encrypted).await?;
                self.cache.remember(encrypted, key.clone());
                Ok((address, key))
            }
            _ => self.create(gateway).await,
        }
    }

    async fn unlock(&self, encrypted: &str) -> CredentialResult<PlaintextKey> {
        for attempt in 1..=self.max_unlock_attempts {
            let password = match self.prompt.prompt_existing().await? {
                PasswordReply::Entered(password) => password,
                PasswordReply::Cancelled => return Err(CredentialError::Cancelled),
            };

            let encoded = encrypted.to_string();
            let result = tokio::task::spawn_blocking(move || {
                account::unlock_encoded(&password, &encoded)
            })
            .await
            .map_err(|e| VaultError::Cipher(format!("unlock task failed: {e}")))?;

            match result {
                Ok(key) => {
                    metrics::record_unlock("ok");
                    tracing::info!(attempt, "Account unlocked");
                    return Ok(key);
                }
                Err(VaultError::InvalidPassword) => {
                    metrics::record_unlock("invalid_password");
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_unlock_attempts,
                        "Invalid password"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(VaultError::InvalidPassword.into())
    }

    async fn create(&self, gateway: &SettingsGateway) -> CredentialResult<(Address, PlaintextKey)> {
        let password = match self.prompt.prompt_new().await? {
            PasswordReply::Entered(password) => password,
            PasswordReply::Cancelled => return Err(CredentialError::Cancelled),
        };

        let NewAccount {
            address,
            secret,
            key,
        } = tokio::task::spawn_blocking(move || account::create_account(&password))
            .await
            .map_err(|e| VaultError::Cipher(format!("account task failed: {e}")))??;

        gateway.set_account(address, &secret).await?;
        self.cache.remember(&secret.to_hex(), key.clone());
        metrics::record_unlock("created");

        Ok((address, key))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cached", &self.cache.len())
            .field("max_unlock_attempts", &self.max_unlock_attempts)
            .finish()
    }
}
