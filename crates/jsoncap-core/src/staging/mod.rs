//! Staging list: captured bodies waiting for a download or a rule decision.
//!
//! Bounded and chronological. Appending past capacity evicts from the front,
//! so the most recent captures survive. Persistence goes through
//! [`persist_with_recovery`], which degrades to a shorter (or empty) list when
//! the settings store runs out of quota.

mod item;
mod persist;

pub use item::{size_label, CapturedItem};
pub use persist::{persist_with_recovery, PersistOutcome};

use std::collections::VecDeque;
use thiserror::Error;

/// Default number of staged items kept.
pub const DEFAULT_CAPACITY: usize = 20;

/// Items kept when the store reports quota exhaustion.
pub const DEFAULT_EMERGENCY_KEEP: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StagingError {
    #[error("no staged item at index {index} (list has {len})")]
    NotFound { index: usize, len: usize },
}

#[derive(Debug, Clone)]
pub struct StagingList {
    items: VecDeque<CapturedItem>,
    capacity: usize,
}

impl Default for StagingList {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl StagingList {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(64)),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild from persisted items (oldest first), keeping the newest `capacity`.
    pub fn with_items(items: Vec<CapturedItem>, capacity: usize) -> Self {
        let mut list = Self::new(capacity);
        list.items.extend(items);
        list.evict_overflow();
        list
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append at the end; returns whatever fell off the front.
    pub fn append(&mut self, item: CapturedItem) -> Vec<CapturedItem> {
        self.items.push_back(item);
        self.evict_overflow()
    }

    fn evict_overflow(&mut self) -> Vec<CapturedItem> {
        let overflow = self.items.len().saturating_sub(self.capacity);
        self.items.drain(..overflow).collect()
    }

    /// Remove every item whose url contains `keyword`. Empty keywords match nothing.
    pub fn remove_matching(&mut self, keyword: &str) -> usize {
        if keyword.is_empty() {
            return 0;
        }
        let before = self.items.len();
        self.items.retain(|item| !item.url.contains(keyword));
        before - self.items.len()
    }

    /// Keep only the `keep` most recent items; returns how many were dropped.
    pub fn retain_recent(&mut self, keep: usize) -> usize {
        let drop = self.items.len().saturating_sub(keep);
        self.items.drain(..drop);
        drop
    }

    pub fn clear(&mut self) -> usize {
        let n = self.items.len();
        self.items.clear();
        n
    }

    pub fn get(&self, index: usize) -> Result<&CapturedItem, StagingError> {
        self.items.get(index).ok_or(StagingError::NotFound {
            index,
            len: self.items.len(),
        })
    }

    pub fn remove(&mut self, index: usize) -> Result<CapturedItem, StagingError> {
        let len = self.items.len();
        self.items
            .remove(index)
            .ok_or(StagingError::NotFound { index, len })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapturedItem> {
        self.items.iter()
    }

    /// Snapshot in chronological order, as persisted.
    pub fn to_vec(&self) -> Vec<CapturedItem> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
