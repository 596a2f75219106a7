//! Account creation and key unlock.
//!
//! # Security
//! - Plaintext keys and passwords are never logged
//! - A wrong password decrypts to garbage; the integrity tag is the only check
//! - Nothing here touches persisted settings; callers persist the result

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use zeroize::Zeroizing;

use crate::vault::kdf;
use crate::vault::secret::{self, EncryptedSecret};
use crate::vault::types::{PlaintextKey, VaultError, VaultResult};

/// A freshly generated account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Public address of the new key pair.
    pub address: Address,
    /// Encrypted private key, ready for persistence.
    pub secret: EncryptedSecret,
    /// Plaintext private key for immediate signing.
    pub key: PlaintextKey,
}

/// Generate a key pair and encrypt its private key under `password`.
pub fn create_account(password: &str) -> VaultResult<NewAccount> {
    let signer = PrivateKeySigner::random();
    let body = Zeroizing::new(hex::encode(signer.to_bytes()));
    let key = PlaintextKey::from_hex_body(&body);
    let secret = encrypt(password, &key)?;

    tracing::info!(address = %signer.address(), "Account created");

    Ok(NewAccount {
        address: signer.address(),
        secret,
        key,
    })
}

/// Encrypt `key` under `password`, tagging the plaintext hex.
pub fn encrypt(password: &str, key: &PlaintextKey) -> VaultResult<EncryptedSecret> {
    let cipher_key = kdf::derive(password);
    let body = key.hex_body();

    let mut buf = body.as_bytes().to_vec();
    secret::apply_keystream(&cipher_key, &mut buf)?;

    Ok(EncryptedSecret::new(buf, secret::integrity_tag(body)))
}

/// Decrypt `secret` with `password` and verify the integrity tag.
///
/// Returns [`VaultError::InvalidPassword`] when the recomputed tag differs.
pub fn unlock(password: &str, secret: &EncryptedSecret) -> VaultResult<PlaintextKey> {
    let cipher_key = kdf::derive(password);

    let mut buf = Zeroizing::new(secret.cipher_bytes().to_vec());
    secret::apply_keystream(&cipher_key, &mut buf)?;

    let plaintext = std::str::from_utf8(&buf).map_err(|_| VaultError::InvalidPassword)?;
    if secret::integrity_tag(plaintext) != *secret.integrity_tag() {
        return Err(VaultError::InvalidPassword);
    }

    Ok(PlaintextKey::from_hex_body(plaintext))
}

/// Unlock a secret in its persisted string form.
///
/// A malformed string is indistinguishable from a wrong password.
pub fn unlock_encoded(password: &str, encoded: &str) -> VaultResult<PlaintextKey> {
    let secret: EncryptedSecret = encoded.parse().map_err(|e| {
        tracing::debug!(error = %e, "Stored secret is malformed");
        VaultError::InvalidPassword
    })?;
    unlock(password, &secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Anvil's first account
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    // Persisted value for TEST_PRIVATE_KEY under "secret".
    const TEST_ENCODED_SECRET: &str = "1784606feaa9a42af4e09896b98d4271cc1ae543ca554ac6801d4691e7b3081b\
        13c24202f1e9cda8877e314866de6d45f91b19d387940ee99bcdda531cda2be5\
        bc1a50966c9e6486bc4ebf880b51611a2a97fcb8e7a6976e9b81a9e3e8ca0e3c";

    #[test]
    fn test_create_then_unlock() {
        let account = create_account("secret").unwrap();
        let encoded = account.secret.to_hex();

        let key = unlock_encoded("secret", &encoded).unwrap();
        assert_eq!(key, account.key);
        assert_eq!(key.signer().unwrap().address(), account.address);
    }

    #[test]
    fn test_encrypt_matches_persisted_format() {
        let key: PlaintextKey = TEST_PRIVATE_KEY.parse().unwrap();
        let secret = encrypt("secret", &key).unwrap();
        assert_eq!(secret.to_hex(), TEST_ENCODED_SECRET);
    }

    #[test]
    fn test_unlock_existing_secret() {
        let key = unlock_encoded("secret", TEST_ENCODED_SECRET).unwrap();
        assert_eq!(key.expose_hex(), format!("0x{}", TEST_PRIVATE_KEY));
    }

    #[test]
    fn test_wrong_password_fails() {
        let err = unlock_encoded("Secret", TEST_ENCODED_SECRET).unwrap_err();
        assert_eq!(err, VaultError::InvalidPassword);
    }

    #[test]
    fn test_corrupted_secret_is_invalid_password() {
        let mut corrupted = TEST_ENCODED_SECRET.to_string();
        corrupted.replace_range(0..2, "00");
        assert_eq!(
            unlock_encoded("secret", &corrupted).unwrap_err(),
            VaultError::InvalidPassword
        );

        assert_eq!(
            unlock_encoded("secret", "not hex at all").unwrap_err(),
            VaultError::InvalidPassword
        );
    }

    #[test]
    fn test_each_account_is_fresh() {
        let a = create_account("pw").unwrap();
        let b = create_account("pw").unwrap();
        assert_ne!(a.address, b.address);
        assert_ne!(a.secret, b.secret);
    }
}
