//! In-memory settings store.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;

use super::{merged_within_quota, Settings, SettingsPatch, SettingsStore, StoreError};

pub struct MemorySettingsStore {
    settings: Mutex<Settings>,
    quota: Option<u64>,
    changes: broadcast::Sender<SettingsPatch>,
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl MemorySettingsStore {
    /// Unlimited store seeded with `settings`.
    pub fn new(settings: Settings) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            settings: Mutex::new(settings),
            quota: None,
            changes,
        }
    }

    /// Enforce `quota` bytes on subsequent writes. The seed itself is not checked.
    pub fn with_quota(mut self, quota: u64) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Current settings without going through the async trait.
    pub fn snapshot(&self) -> Settings {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Settings, StoreError> {
        Ok(self.snapshot())
    }

    async fn apply(&self, patch: SettingsPatch) -> Result<(), StoreError> {
        {
            let mut current = self.settings.lock().unwrap_or_else(PoisonError::into_inner);
            let next = merged_within_quota(&current, &patch, self.quota)?;
            *current = next;
        }
        let _ = self.changes.send(patch);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingsPatch> {
        self.changes.subscribe()
    }
}
