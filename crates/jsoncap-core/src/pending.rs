//! Pending request table: correlates response-started with body-ready.
//!
//! Entries are inserted synchronously when a response passes the type gate,
//! before any await, so a body-ready that overtakes the deferred filter
//! decision still finds its entry. There is no expiry: an entry whose
//! body-ready never arrives lives until the session stops.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::event::{RequestId, ResponseEvent};

/// Metadata held between the two phases of a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCapture {
    pub response: ResponseEvent,
    pub queued_at: DateTime<Utc>,
}

impl PendingCapture {
    pub fn new(response: ResponseEvent, queued_at: DateTime<Utc>) -> Self {
        Self {
            response,
            queued_at,
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.response.request_id
    }

    pub fn url(&self) -> &str {
        &self.response.url
    }
}

#[derive(Debug)]
struct Slot {
    capture: PendingCapture,
    fetching: bool,
}

#[derive(Debug, Default)]
pub struct PendingTable {
    entries: HashMap<RequestId, Slot>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a capture. A previous entry under the same id is replaced and returned.
    pub fn insert(&mut self, capture: PendingCapture) -> Option<PendingCapture> {
        let id = capture.request_id().clone();
        self.entries
            .insert(
                id,
                Slot {
                    capture,
                    fetching: false,
                },
            )
            .map(|slot| slot.capture)
    }

    /// Drop an entry whose deferred decision came back as ignore.
    /// If its body is already being fetched, that fetch will be discarded.
    pub fn discard(&mut self, id: &RequestId) -> Option<PendingCapture> {
        self.entries.remove(id).map(|slot| slot.capture)
    }

    /// Body-ready: mark the entry as fetching and hand out its metadata.
    ///
    /// Returns `None` when the id was never queued, was already dropped, or is
    /// already being fetched.
    pub fn claim(&mut self, id: &RequestId) -> Option<PendingCapture> {
        let slot = self.entries.get_mut(id)?;
        if slot.fetching {
            return None;
        }
        slot.fetching = true;
        Some(slot.capture.clone())
    }

    /// Body fetch finished: remove the claimed entry.
    ///
    /// `None` means the entry disappeared while the fetch was in flight (session
    /// stopped or late ignore); the fetched body must then be dropped.
    pub fn complete(&mut self, id: &RequestId) -> Option<PendingCapture> {
        match self.entries.get(id) {
            Some(slot) if slot.fetching => self.entries.remove(id).map(|slot| slot.capture),
            _ => None,
        }
    }

    /// Session stop: abandon every correlation. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
