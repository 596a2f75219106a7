//! Credential resolution against an in-memory settings store.

mod common;

use std::sync::Arc;

use common::{CountingPrompt, TEST_ADDRESS, TEST_ENCODED_SECRET, TEST_PRIVATE_KEY};
use contract_deployer::settings::{AccountSettings, MemorySettingsStore, SettingsGateway};
use contract_deployer::vault::{self, CredentialError, Credentials, PlaintextKey, VaultError};

fn gateway(settings: AccountSettings) -> SettingsGateway {
    SettingsGateway::new(Arc::new(MemorySettingsStore::new(settings)))
}

#[tokio::test]
async fn test_cached_key_skips_prompt() {
    let gateway = gateway(common::unlocked_settings());
    let prompt = CountingPrompt::answering(&["secret"]);
    let credentials = Credentials::new(prompt.clone(), 3);

    let (address, key) = credentials.signing_key(&gateway).await.unwrap();
    assert_eq!(address, TEST_ADDRESS);
    assert_eq!(key.hex_body(), TEST_PRIVATE_KEY);

    let (_, again) = credentials.signing_key(&gateway).await.unwrap();
    assert_eq!(again, key);
    assert_eq!(prompt.existing_prompts(), 1);
    assert_eq!(credentials.cache().len(), 1);
}

#[tokio::test]
async fn test_changed_secret_forces_unlock() {
    let gateway = gateway(common::unlocked_settings());
    let prompt = CountingPrompt::answering(&["secret", "rotated"]);
    let credentials = Credentials::new(prompt.clone(), 1);

    credentials.signing_key(&gateway).await.unwrap();

    let key: PlaintextKey = TEST_PRIVATE_KEY.parse().unwrap();
    let reencrypted = vault::encrypt("rotated", &key).unwrap().to_hex();
    gateway
        .update(move |s| s.encrypted_key = Some(reencrypted))
        .await
        .unwrap();

    let (_, unlocked) = credentials.signing_key(&gateway).await.unwrap();
    assert_eq!(unlocked, key);
    assert_eq!(prompt.existing_prompts(), 2);
}

#[tokio::test]
async fn test_wrong_password_leaves_cache_empty() {
    let gateway = gateway(common::unlocked_settings());
    let prompt = CountingPrompt::answering(&["Secret"]);
    let credentials = Credentials::new(prompt.clone(), 1);

    let err = credentials.signing_key(&gateway).await.unwrap_err();
    assert!(err.is_invalid_password());
    assert!(matches!(err, CredentialError::Vault(VaultError::InvalidPassword)));
    assert!(credentials.cache().is_empty());
}

#[tokio::test]
async fn test_wrong_password_reprompts() {
    let gateway = gateway(common::unlocked_settings());
    let prompt = CountingPrompt::answering(&["nope", "still nope", "secret"]);
    let credentials = Credentials::new(prompt.clone(), 3);

    let (_, key) = credentials.signing_key(&gateway).await.unwrap();
    assert_eq!(key.hex_body(), TEST_PRIVATE_KEY);
    assert_eq!(prompt.existing_prompts(), 3);
}

#[tokio::test]
async fn test_corrupted_secret_is_invalid_password() {
    let mut settings = common::unlocked_settings();
    settings.encrypted_key = Some(format!("zz{}", &TEST_ENCODED_SECRET[2..]));
    let gateway = gateway(settings);
    let credentials = Credentials::new(CountingPrompt::answering(&["secret"]), 1);

    let err = credentials.signing_key(&gateway).await.unwrap_err();
    assert!(err.is_invalid_password());
}

#[tokio::test]
async fn test_cancelled_prompt() {
    let gateway = gateway(common::unlocked_settings());
    let prompt = CountingPrompt::cancelling();
    let credentials = Credentials::new(prompt.clone(), 3);

    let err = credentials.signing_key(&gateway).await.unwrap_err();
    assert!(matches!(err, CredentialError::Cancelled));
    assert_eq!(prompt.existing_prompts(), 1);
    assert!(credentials.cache().is_empty());
}

#[tokio::test]
async fn test_missing_account_is_created_and_persisted() {
    let gateway = gateway(AccountSettings::default());
    let prompt = CountingPrompt::answering(&["secret"]);
    let credentials = Credentials::new(prompt.clone(), 3);

    let (address, key) = credentials.signing_key(&gateway).await.unwrap();
    assert_eq!(prompt.new_prompts(), 1);

    let saved = gateway.load().await.unwrap();
    let (saved_address, encrypted) = saved.account().unwrap();
    assert_eq!(saved_address, address);
    assert_eq!(vault::unlock_encoded("secret", encrypted).unwrap(), key);
    assert_eq!(key.signer().unwrap().address(), address);

    // Created keys are cached like unlocked ones.
    credentials.signing_key(&gateway).await.unwrap();
    assert_eq!(prompt.existing_prompts(), 0);
}

#[tokio::test]
async fn test_half_initialized_account_is_replaced() {
    let gateway = gateway(AccountSettings {
        address: Some(TEST_ADDRESS),
        encrypted_key: None,
        ..Default::default()
    });
    let prompt = CountingPrompt::answering(&["fresh"]);
    let credentials = Credentials::new(prompt.clone(), 3);

    let (address, _) = credentials.signing_key(&gateway).await.unwrap();
    assert_ne!(address, TEST_ADDRESS);
    assert_eq!(prompt.new_prompts(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_first_use_creates_one_account() {
    let gateway = gateway(AccountSettings::default());
    let prompt = CountingPrompt::answering(&["secret", "secret"]);
    let credentials = Credentials::new(prompt.clone(), 3);

    let (first, second) = tokio::join!(
        credentials.signing_key(&gateway),
        credentials.signing_key(&gateway)
    );
    let (a, key_a) = first.unwrap();
    let (b, key_b) = second.unwrap();

    assert_eq!(a, b);
    assert_eq!(key_a, key_b);
    assert_eq!(prompt.new_prompts(), 1);
    assert_eq!(prompt.existing_prompts(), 0);

    let saved = gateway.load().await.unwrap();
    assert_eq!(saved.account().map(|(address, _)| address), Some(a));
}
