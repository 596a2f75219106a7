//! Persisted workspace settings.
//!
//! # Data Flow
//! ```text
//! settings.json
//!     → store.rs (atomic load / save of the whole snapshot)
//!     → gateway.rs (FIFO read-modify-write)
//!     → credentials (account pair), workflow (contract addresses)
//! ```

pub mod gateway;
pub mod store;
pub mod types;

pub use gateway::SettingsGateway;
pub use store::{JsonFileSettingsStore, MemorySettingsStore, SettingsStore};
pub use types::{AccountSettings, SettingsError, SettingsResult};
