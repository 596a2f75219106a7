//! Settings storage backends.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::settings::types::{AccountSettings, SettingsResult};

/// Durable load/save of the whole settings snapshot.
///
/// Each call is atomic on its own; read-modify-write sequencing is the
/// gateway's job.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the current snapshot. A store with nothing saved yields defaults.
    async fn load(&self) -> SettingsResult<AccountSettings>;

    /// Replace the stored snapshot.
    async fn save(&self, settings: &AccountSettings) -> SettingsResult<()>;
}

/// In-memory settings, lost at process exit.
#[derive(Debug, Default, Clone)]
pub struct MemorySettingsStore {
    settings: Arc<RwLock<AccountSettings>>,
}

impl MemorySettingsStore {
    pub fn new(initial: AccountSettings) -> Self {
        Self {
            settings: Arc::new(RwLock::new(initial)),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> SettingsResult<AccountSettings> {
        Ok(self.settings.read().await.clone())
    }

    async fn save(&self, settings: &AccountSettings) -> SettingsResult<()> {
        *self.settings.write().await = settings.clone();
        Ok(())
    }
}

/// JSON file settings.
///
/// Saves write a sibling temp file and rename it over the target, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn load(&self) -> SettingsResult<AccountSettings> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(AccountSettings::default());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, settings: &AccountSettings) -> SettingsResult<()> {
        let content = serde_json::to_string_pretty(settings)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, content).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        tracing::debug!(path = ?self.path, contracts = settings.contracts.len(), "Settings saved");
        Ok(())
    }
}
