//! Account key vault.
//!
//! # Data Flow
//! ```text
//! password
//!     → kdf.rs (PBKDF2-HMAC-SHA512 → 256-bit cipher key)
//!     → account.rs (create / encrypt / unlock)
//!     → secret.rs (AES-256-CTR, sha256 integrity tag, hex wire format)
//!
//! settings snapshot
//!     → cache.rs (encrypted value → plaintext key)
//!     → credentials.rs (prompt on miss, persist new accounts)
//! ```
//!
//! # Security Constraints
//! - Plaintext keys live only in memory and are wiped on drop
//! - Passwords and keys are never logged
//! - Wrong password and corrupted storage both surface as `InvalidPassword`

pub mod account;
pub mod cache;
pub mod credentials;
pub mod kdf;
pub mod secret;
pub mod types;

pub use account::{create_account, encrypt, unlock, unlock_encoded, NewAccount};
pub use cache::{CacheLookup, CredentialCache};
pub use credentials::{CredentialError, CredentialResult, Credentials};
pub use secret::EncryptedSecret;
pub use types::{PlaintextKey, VaultError, VaultResult};
