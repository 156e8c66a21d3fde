//! Settings: the persisted key set shared by the capture pipeline and the UI.
//!
//! The store is an external collaborator. It is reached through the
//! [`SettingsStore`] trait; two implementations ship here, a JSON file under
//! the XDG state dir and an in-memory store. Both enforce a byte quota on the
//! serialized settings so quota exhaustion is a real, recoverable error.

mod file;
mod memory;
pub mod rules;
pub mod transfer;

pub use file::FileSettingsStore;
pub use memory::MemorySettingsStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::filter::{Mode, RuleSet, WhitelistEntry};
use crate::staging::CapturedItem;

/// Default quota, matching the common 10 MiB browser local-storage budget.
pub const DEFAULT_QUOTA_BYTES: u64 = 10 * 1024 * 1024;

/// Everything persisted under the recognized keys. Missing keys read as defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub is_recording: bool,
    pub mode: Mode,
    pub smart_filter: bool,
    pub whitelist: Vec<WhitelistEntry>,
    pub blacklist: Vec<String>,
    pub filename_prefix: String,
    pub captured_requests: Vec<CapturedItem>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            is_recording: false,
            mode: Mode::Auto,
            smart_filter: true,
            whitelist: Vec::new(),
            blacklist: Vec::new(),
            filename_prefix: String::new(),
            captured_requests: Vec::new(),
        }
    }
}

impl Settings {
    /// Snapshot of the filter-relevant keys.
    pub fn rules(&self) -> RuleSet {
        RuleSet {
            mode: self.mode,
            smart_filter: self.smart_filter,
            whitelist: self.whitelist.clone(),
            blacklist: self.blacklist.clone(),
        }
    }

    /// Overwrite the keys present in `patch`.
    pub fn merge(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.is_recording {
            self.is_recording = v;
        }
        if let Some(v) = patch.mode {
            self.mode = v;
        }
        if let Some(v) = patch.smart_filter {
            self.smart_filter = v;
        }
        if let Some(v) = &patch.whitelist {
            self.whitelist = v.clone();
        }
        if let Some(v) = &patch.blacklist {
            self.blacklist = v.clone();
        }
        if let Some(v) = &patch.filename_prefix {
            self.filename_prefix = v.clone();
        }
        if let Some(v) = &patch.captured_requests {
            self.captured_requests = v.clone();
        }
    }

    /// Size the store charges against its quota.
    pub fn encoded_len(&self) -> Result<u64, StoreError> {
        Ok(serde_json::to_vec(self)?.len() as u64)
    }
}

/// Partial write: only `Some` keys are stored. Also the change notification payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recording: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart_filter: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whitelist: Option<Vec<WhitelistEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blacklist: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_requests: Option<Vec<CapturedItem>>,
}

impl SettingsPatch {
    pub fn captured(items: Vec<CapturedItem>) -> Self {
        Self {
            captured_requests: Some(items),
            ..Self::default()
        }
    }

    pub fn recording(on: bool) -> Self {
        Self {
            is_recording: Some(on),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: u64, quota: u64 },
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StoreError::QuotaExceeded { .. })
    }
}

/// Key-value settings store with change notifications.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Settings, StoreError>;

    /// Write the keys present in `patch`. Either all of them land or none do.
    async fn apply(&self, patch: SettingsPatch) -> Result<(), StoreError>;

    /// Receives every successfully applied patch.
    fn subscribe(&self) -> broadcast::Receiver<SettingsPatch>;
}

/// Merge `patch` into `current` and enforce `quota`; returns the merged settings.
pub(crate) fn merged_within_quota(
    current: &Settings,
    patch: &SettingsPatch,
    quota: Option<u64>,
) -> Result<Settings, StoreError> {
    let mut next = current.clone();
    next.merge(patch);
    if let Some(quota) = quota {
        let needed = next.encoded_len()?;
        if needed > quota {
            return Err(StoreError::QuotaExceeded { needed, quota });
        }
    }
    Ok(next)
}
