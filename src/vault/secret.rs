//! Encrypted secret encoding.
//!
//! # Wire format
//! ```text
//! hex(AES-256-CTR(privateKeyHex)) || hex(sha256(privateKeyHex))
//! ```
//! The integrity tag is always the trailing 64 hex characters, so the two
//! halves split without a separator regardless of ciphertext length.

use std::fmt;
use std::str::FromStr;

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::vault::kdf::DerivedKey;
use crate::vault::types::{VaultError, VaultResult};

/// Integrity tag length in bytes.
pub const TAG_LEN: usize = 32;

/// Integrity tag length in hex characters.
pub const TAG_HEX_LEN: usize = TAG_LEN * 2;

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// Initial counter block: big-endian 128-bit counter starting at 1.
const INITIAL_COUNTER: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];

/// Reasons a persisted secret string cannot be split into its parts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SecretFormatError {
    #[error("encoded secret has {0} characters, fewer than the {TAG_HEX_LEN}-character tag")]
    TooShort(usize),

    #[error("encoded secret is not hex: {0}")]
    NotHex(#[from] hex::FromHexError),
}

/// Ciphertext plus the integrity tag of its plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedSecret {
    cipher_bytes: Vec<u8>,
    integrity_tag: [u8; TAG_LEN],
}

impl EncryptedSecret {
    pub fn new(cipher_bytes: Vec<u8>, integrity_tag: [u8; TAG_LEN]) -> Self {
        Self {
            cipher_bytes,
            integrity_tag,
        }
    }

    pub fn cipher_bytes(&self) -> &[u8] {
        &self.cipher_bytes
    }

    pub fn integrity_tag(&self) -> &[u8; TAG_LEN] {
        &self.integrity_tag
    }

    /// Persisted representation: cipher hex followed by tag hex.
    pub fn to_hex(&self) -> String {
        let mut out = hex::encode(&self.cipher_bytes);
        out.push_str(&hex::encode(self.integrity_tag));
        out
    }
}

impl fmt::Display for EncryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for EncryptedSecret {
    type Err = SecretFormatError;

    fn from_str(encoded: &str) -> Result<Self, Self::Err> {
        if encoded.len() < TAG_HEX_LEN {
            return Err(SecretFormatError::TooShort(encoded.len()));
        }
        if let Some((index, c)) = encoded.char_indices().find(|(_, c)| !c.is_ascii()) {
            return Err(hex::FromHexError::InvalidHexCharacter { c, index }.into());
        }

        let (cipher_hex, tag_hex) = encoded.split_at(encoded.len() - TAG_HEX_LEN);
        let cipher_bytes = hex::decode(cipher_hex)?;
        let mut integrity_tag = [0u8; TAG_LEN];
        hex::decode_to_slice(tag_hex, &mut integrity_tag)?;

        Ok(Self {
            cipher_bytes,
            integrity_tag,
        })
    }
}

/// SHA-256 over the plaintext key's hex string.
pub fn integrity_tag(plaintext_hex: &str) -> [u8; TAG_LEN] {
    Sha256::digest(plaintext_hex.as_bytes()).into()
}

/// Apply the AES-256-CTR keystream in place. Encryption and decryption are
/// the same operation.
pub(crate) fn apply_keystream(key: &DerivedKey, data: &mut [u8]) -> VaultResult<()> {
    let mut cipher = Aes256Ctr::new_from_slices(key.as_bytes(), &INITIAL_COUNTER)
        .map_err(|e| VaultError::Cipher(e.to_string()))?;
    cipher.apply_keystream(data);
    Ok(())
}
