//! Scriptable collaborators: body sources, settings stores and download sinks.

use async_trait::async_trait;
use jsoncap_core::capture::{BodySource, FetchError};
use jsoncap_core::event::{NetworkEvent, RequestId, ResponseEvent};
use jsoncap_core::settings::{
    MemorySettingsStore, Settings, SettingsPatch, SettingsStore, StoreError,
};
use jsoncap_core::sink::{DownloadError, DownloadId, DownloadSink};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, Semaphore};

pub fn json_response(id: &str, url: &str) -> NetworkEvent {
    NetworkEvent::ResponseStarted(ResponseEvent::new(id, url, "application/json", 200))
}

/// A gate tasks park on until the test opens it.
pub struct Gate {
    permits: Semaphore,
    waiting: AtomicUsize,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            permits: Semaphore::new(0),
            waiting: AtomicUsize::new(0),
        }
    }
}

impl Gate {
    pub async fn pass(&self) {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }

    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    pub fn open(&self, n: usize) {
        self.permits.add_permits(n);
    }

    /// Yield until `n` tasks are parked here.
    pub async fn until_waiting(&self, n: usize) {
        for _ in 0..1000 {
            if self.waiting() >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("only {} of {} tasks reached the gate", self.waiting(), n);
    }
}

/// Bodies by request id; unknown ids answer "no resource".
#[derive(Default)]
pub struct MapBodies {
    bodies: HashMap<String, String>,
    pub gate: Option<Arc<Gate>>,
}

impl MapBodies {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            bodies: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            gate: None,
        }
    }

    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl BodySource for MapBodies {
    async fn fetch_body(&self, request_id: &RequestId) -> Result<String, FetchError> {
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        self.bodies
            .get(request_id.as_str())
            .cloned()
            .ok_or(FetchError::NotFound)
    }
}

/// Memory store whose `load` can be held at a gate, and whose `apply` can be made to fail.
pub struct ScriptedStore {
    pub inner: MemorySettingsStore,
    pub load_gate: Option<Arc<Gate>>,
    fail_apply: AtomicBool,
}

impl ScriptedStore {
    pub fn new(inner: MemorySettingsStore) -> Self {
        Self {
            inner,
            load_gate: None,
            fail_apply: AtomicBool::new(false),
        }
    }

    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.load_gate = Some(gate);
        self
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_apply.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Settings {
        self.inner.snapshot()
    }
}

#[async_trait]
impl SettingsStore for ScriptedStore {
    async fn load(&self) -> Result<Settings, StoreError> {
        if let Some(gate) = &self.load_gate {
            gate.pass().await;
        }
        self.inner.load().await
    }

    async fn apply(&self, patch: SettingsPatch) -> Result<(), StoreError> {
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk unplugged")));
        }
        self.inner.apply(patch).await
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingsPatch> {
        self.inner.subscribe()
    }
}

/// Keeps every download in memory; can be told to refuse urls containing a marker.
#[derive(Default)]
pub struct RecordingSink {
    saved: Mutex<Vec<(String, String)>>,
    refuse: Mutex<Option<String>>,
}

impl RecordingSink {
    /// `(filename, content)` in download order.
    pub fn saved(&self) -> Vec<(String, String)> {
        self.saved.lock().unwrap().clone()
    }

    /// Fail every download whose content contains `marker`.
    pub fn refuse_containing(&self, marker: &str) {
        *self.refuse.lock().unwrap() = Some(marker.to_string());
    }
}

#[async_trait]
impl DownloadSink for RecordingSink {
    async fn download(&self, content: &str, filename: &str) -> Result<DownloadId, DownloadError> {
        if let Some(marker) = self.refuse.lock().unwrap().as_deref() {
            if content.contains(marker) {
                return Err(DownloadError::Io(std::io::Error::new(std::io::ErrorKind::Other, "refused")));
            }
        }
        let mut saved = self.saved.lock().unwrap();
        saved.push((filename.to_string(), content.to_string()));
        Ok(DownloadId(saved.len() as u64))
    }
}
