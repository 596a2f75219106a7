//! Password-based cipher key derivation.
//!
//! PBKDF2-HMAC-SHA512 with an empty salt and a single iteration. These
//! parameters are fixed by the persisted secret format: every stored
//! `encryptedKey` was produced with them, so changing any of them makes
//! existing accounts unrecoverable. The same password always yields the
//! same key.

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count.
pub const ITERATIONS: u32 = 1;

const SALT: &[u8] = b"";

/// A 256-bit symmetric key derived from a password.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

/// Derive the cipher key for `password`.
pub fn derive(password: &str) -> DerivedKey {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), SALT, ITERATIONS, &mut key);
    DerivedKey(key)
}
