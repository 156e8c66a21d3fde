//! Writing the staging list back to the settings store, with quota recovery.
//!
//! On quota exhaustion the list is trimmed to the most recent few items and
//! written once more; if that also fails the list is cleared. Restoring a
//! working store wins over keeping partial data.

use crate::settings::{SettingsPatch, SettingsStore};

use super::StagingList;

/// What happened to the list on its way to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved,
    /// Quota hit; `dropped` oldest items were removed and the retry succeeded.
    Trimmed { dropped: usize },
    /// Quota hit twice; the list was emptied.
    Cleared { dropped: usize },
    /// Any other store failure. The in-memory list is left as it was.
    Failed(String),
}

impl PersistOutcome {
    pub fn lost_items(&self) -> usize {
        match self {
            PersistOutcome::Trimmed { dropped } | PersistOutcome::Cleared { dropped } => *dropped,
            PersistOutcome::Saved | PersistOutcome::Failed(_) => 0,
        }
    }
}

pub async fn persist_with_recovery<S>(
    store: &S,
    list: &mut StagingList,
    emergency_keep: usize,
) -> PersistOutcome
where
    S: SettingsStore + ?Sized,
{
    let err = match store.apply(SettingsPatch::captured(list.to_vec())).await {
        Ok(()) => return PersistOutcome::Saved,
        Err(err) => err,
    };
    if !err.is_quota_exceeded() {
        tracing::error!("staging list save failed: {}", err);
        return PersistOutcome::Failed(err.to_string());
    }

    tracing::warn!(
        keep = emergency_keep,
        "storage quota exceeded; trimming staging list"
    );
    let mut dropped = list.retain_recent(emergency_keep);
    match store.apply(SettingsPatch::captured(list.to_vec())).await {
        Ok(()) => PersistOutcome::Trimmed { dropped },
        Err(retry_err) => {
            tracing::error!(
                "staging list save failed even after trimming, clearing it: {}",
                retry_err
            );
            dropped += list.clear();
            if let Err(e) = store.apply(SettingsPatch::captured(Vec::new())).await {
                tracing::error!("could not persist empty staging list: {}", e);
            }
            PersistOutcome::Cleared { dropped }
        }
    }
}
