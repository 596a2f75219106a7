//! Vault key types and error definitions.

use std::fmt;
use std::str::FromStr;

use alloy::signers::local::PrivateKeySigner;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a secp256k1 private key in hex characters (no `0x` prefix).
pub const PRIVATE_KEY_HEX_LEN: usize = 64;

/// Errors raised by key derivation, encryption and decryption.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// Integrity tag mismatch on unlock. Also covers corrupted storage.
    #[error("Invalid password")]
    InvalidPassword,

    /// The stream cipher could not be initialized.
    #[error("Cipher error: {0}")]
    Cipher(String),

    /// Key material is not a usable secp256k1 private key.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),
}

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// A decrypted signing key, held as `0x`-prefixed lowercase hex.
///
/// Never printed: `Debug` is redacted and the buffer is wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PlaintextKey(String);

impl PlaintextKey {
    /// Wrap key hex that has already been validated by the vault.
    pub(crate) fn from_hex_body(body: &str) -> Self {
        Self(format!("0x{body}"))
    }

    /// The key as `0x`-prefixed hex.
    pub fn expose_hex(&self) -> &str {
        &self.0
    }

    /// The key hex without the `0x` prefix. This is the string the integrity
    /// tag is computed over.
    pub fn hex_body(&self) -> &str {
        self.0.strip_prefix("0x").unwrap_or(&self.0)
    }

    /// Build a local signer for this key.
    pub fn signer(&self) -> VaultResult<PrivateKeySigner> {
        self.hex_body()
            .parse::<PrivateKeySigner>()
            .map_err(|e| VaultError::InvalidKey(e.to_string()))
    }
}

impl FromStr for PlaintextKey {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix("0x").unwrap_or(s);
        if body.len() != PRIVATE_KEY_HEX_LEN || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(VaultError::InvalidKey(format!(
                "expected {PRIVATE_KEY_HEX_LEN} hex characters"
            )));
        }
        Ok(Self::from_hex_body(&body.to_ascii_lowercase()))
    }
}

impl fmt::Debug for PlaintextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlaintextKey(<redacted>)")
    }
}
