//! Settings persisted as pretty JSON under the XDG state dir.
//!
//! The file is the source of truth: every `load` reads it, every `apply`
//! re-reads, merges, checks quota, and replaces the file through a `.part`
//! rename so a crash never leaves half-written settings.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, Mutex};

use super::{merged_within_quota, Settings, SettingsPatch, SettingsStore, StoreError};

pub struct FileSettingsStore {
    path: PathBuf,
    quota: Option<u64>,
    write_lock: Mutex<()>,
    changes: broadcast::Sender<SettingsPatch>,
}

impl FileSettingsStore {
    /// Default location: `~/.local/state/jsoncap/settings.json`.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("jsoncap")?;
        Ok(xdg_dirs.place_state_file("settings.json")?)
    }

    /// Open the store at `path`, writing a default settings file if none exists.
    pub async fn open(path: impl AsRef<Path>, quota: Option<u64>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let (changes, _) = broadcast::channel(64);
        let store = Self {
            path,
            quota,
            write_lock: Mutex::new(()),
            changes,
        };
        if !tokio::fs::try_exists(&store.path).await? {
            store.write(&Settings::default()).await?;
            tracing::info!("created default settings at {}", store.path.display());
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Settings, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, settings: &Settings) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(settings)?;
        let mut part = self.path.as_os_str().to_owned();
        part.push(".part");
        let part = PathBuf::from(part);
        tokio::fs::write(&part, json).await?;
        tokio::fs::rename(&part, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Result<Settings, StoreError> {
        self.read().await
    }

    async fn apply(&self, patch: SettingsPatch) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let current = self.read().await?;
        let next = merged_within_quota(&current, &patch, self.quota)?;
        self.write(&next).await?;
        let _ = self.changes.send(patch);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingsPatch> {
        self.changes.subscribe()
    }
}
