use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinHandle, JoinSet};

use crate::config::JsoncapConfig;
use crate::event::{NetworkEvent, RequestId, ResponseEvent};
use crate::filename::download_filename;
use crate::filter::{decide, type_gate, Decision};
use crate::pending::{PendingCapture, PendingTable};
use crate::settings::{Settings, SettingsStore, StoreError};
use crate::sink::{DownloadId, DownloadSink};
use crate::staging::{
    persist_with_recovery, CapturedItem, PersistOutcome, StagingList, DEFAULT_CAPACITY,
    DEFAULT_EMERGENCY_KEEP,
};

use super::body::format_body;
use super::classify::{classify_fetch_error, FetchFailureKind};
use super::notice::Notice;
use super::outcome::{RequestOutcome, SessionSummary};
use super::BodySource;

const NOTICE_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorOptions {
    pub staging_capacity: usize,
    pub emergency_keep: usize,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            staging_capacity: DEFAULT_CAPACITY,
            emergency_keep: DEFAULT_EMERGENCY_KEEP,
        }
    }
}

impl From<&JsoncapConfig> for CoordinatorOptions {
    fn from(cfg: &JsoncapConfig) -> Self {
        Self {
            staging_capacity: cfg.staging_capacity,
            emergency_keep: cfg.emergency_keep,
        }
    }
}

/// Work left over after the synchronous half of event handling.
pub enum Step {
    /// Nothing left to do.
    Done(RequestOutcome),
    /// Queued; the filter decision still needs the current rules.
    Decide(ResponseEvent),
    /// Claimed on body-ready; fetch the body and process it.
    Fetch {
        capture: PendingCapture,
        bodies: Arc<dyn BodySource>,
    },
}

/// Owns the capture pipeline for one settings store and download sink.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Coordinator {
    pub(super) inner: Arc<Inner>,
}

pub(super) struct Inner {
    pub(super) store: Arc<dyn SettingsStore>,
    pub(super) sink: Arc<dyn DownloadSink>,
    pending: Mutex<PendingTable>,
    pub(super) staging: tokio::sync::Mutex<StagingList>,
    session: Mutex<Option<Arc<dyn BodySource>>>,
    notices: broadcast::Sender<Notice>,
    pub(super) options: CoordinatorOptions,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Coordinator {
    /// Build a coordinator, seeding the staging list from the store.
    pub async fn open(
        store: Arc<dyn SettingsStore>,
        sink: Arc<dyn DownloadSink>,
        options: CoordinatorOptions,
    ) -> Result<Self, StoreError> {
        let settings = store.load().await?;
        let staging = StagingList::with_items(settings.captured_requests, options.staging_capacity);
        tracing::debug!(staged = staging.len(), "coordinator opened");
        let (notices, _) = broadcast::channel(NOTICE_BUFFER);
        Ok(Self {
            inner: Arc::new(Inner {
                store,
                sink,
                pending: Mutex::new(PendingTable::new()),
                staging: tokio::sync::Mutex::new(staging),
                session: Mutex::new(None),
                notices,
                options,
            }),
        })
    }

    /// Start a recording session reading bodies from `bodies`.
    /// Returns false if one is already running.
    pub fn start(&self, bodies: Arc<dyn BodySource>) -> bool {
        let mut session = lock(&self.inner.session);
        if session.is_some() {
            return false;
        }
        *session = Some(bodies);
        tracing::info!("recording started");
        true
    }

    /// Stop recording and abandon every pending capture. Returns how many were dropped.
    pub fn stop(&self) -> usize {
        let was_running = lock(&self.inner.session).take().is_some();
        let dropped = lock(&self.inner.pending).clear();
        if was_running {
            tracing::info!(dropped, "recording stopped");
        }
        dropped
    }

    pub fn is_recording(&self) -> bool {
        lock(&self.inner.session).is_some()
    }

    /// Number of captures waiting for their body.
    pub fn pending_len(&self) -> usize {
        lock(&self.inner.pending).len()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    /// Current staging list, oldest first.
    pub async fn staged(&self) -> Vec<CapturedItem> {
        self.inner.staging.lock().await.to_vec()
    }

    pub(super) fn notify(&self, notice: Notice) {
        // No receivers is fine.
        let _ = self.inner.notices.send(notice);
    }

    /// Start and stop with the store's `isRecording` flag.
    pub fn follow_recording_flag(&self, bodies: Arc<dyn BodySource>) -> JoinHandle<()> {
        let mut changes = self.inner.store.subscribe();
        let this = self.clone();
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(patch) => match patch.is_recording {
                        Some(true) => {
                            this.start(Arc::clone(&bodies));
                        }
                        Some(false) => {
                            this.stop();
                        }
                        None => {}
                    },
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "settings notifications lagged; resyncing");
                        match this.inner.store.load().await {
                            Ok(settings) if settings.is_recording => {
                                this.start(Arc::clone(&bodies));
                            }
                            Ok(_) => {
                                this.stop();
                            }
                            Err(e) => tracing::error!("settings reload failed: {}", e),
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Synchronous half of event handling. Never awaits.
    pub fn begin(&self, event: NetworkEvent) -> Step {
        let session = lock(&self.inner.session).clone();
        let bodies = match session {
            Some(bodies) => bodies,
            None => return Step::Done(RequestOutcome::NotRecording),
        };
        match event {
            NetworkEvent::ResponseStarted(response) => {
                if let Some(reason) = type_gate(&response) {
                    tracing::debug!(url = %response.url, "skipped: {}", reason);
                    return Step::Done(RequestOutcome::Ignored(reason));
                }
                let capture = PendingCapture::new(response.clone(), Utc::now());
                lock(&self.inner.pending).insert(capture);
                Step::Decide(response)
            }
            NetworkEvent::BodyReady { request_id } => {
                match lock(&self.inner.pending).claim(&request_id) {
                    Some(capture) => Step::Fetch { capture, bodies },
                    None => Step::Done(RequestOutcome::NotQueued),
                }
            }
        }
    }

    /// Asynchronous half of event handling.
    pub async fn finish(&self, step: Step) -> RequestOutcome {
        match step {
            Step::Done(outcome) => outcome,
            Step::Decide(response) => self.decide_queued(response).await,
            Step::Fetch { capture, bodies } => self.fetch_and_process(capture, bodies).await,
        }
    }

    pub async fn handle_event(&self, event: NetworkEvent) -> RequestOutcome {
        let step = self.begin(event);
        self.finish(step).await
    }

    /// Consume events until the channel closes, handling each one as its own task.
    pub async fn run(&self, mut events: mpsc::Receiver<NetworkEvent>) -> SessionSummary {
        let mut summary = SessionSummary::default();
        let mut tasks: JoinSet<RequestOutcome> = JoinSet::new();
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    match self.begin(event) {
                        Step::Done(outcome) => summary.record(&outcome),
                        step => {
                            let this = self.clone();
                            tasks.spawn(async move { this.finish(step).await });
                        }
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    record_joined(&mut summary, joined);
                }
            }
        }
        while let Some(joined) = tasks.join_next().await {
            record_joined(&mut summary, joined);
        }
        summary
    }

    async fn decide_queued(&self, response: ResponseEvent) -> RequestOutcome {
        let settings = match self.inner.store.load().await {
            Ok(settings) => settings,
            Err(e) => {
                // Decided again at body-ready.
                tracing::error!(url = %response.url, "settings load failed: {}", e);
                return RequestOutcome::Pending;
            }
        };
        match decide(&response, &settings.rules()) {
            Decision::Ignore(reason) => {
                lock(&self.inner.pending).discard(&response.request_id);
                tracing::debug!(url = %response.url, "skipped: {}", reason);
                RequestOutcome::Ignored(reason)
            }
            Decision::Stage | Decision::AutoSave => {
                tracing::debug!(
                    url = %response.url,
                    pending = self.pending_len(),
                    "queued for body"
                );
                RequestOutcome::Pending
            }
        }
    }

    async fn fetch_and_process(
        &self,
        capture: PendingCapture,
        bodies: Arc<dyn BodySource>,
    ) -> RequestOutcome {
        let id: &RequestId = capture.request_id();
        let fetched = bodies.fetch_body(id).await;
        let still_queued = lock(&self.inner.pending).complete(id).is_some();

        let body = match fetched {
            Ok(body) => body,
            Err(e) => {
                return match classify_fetch_error(&e) {
                    FetchFailureKind::Unavailable => {
                        tracing::debug!(url = %capture.url(), "body unavailable");
                        RequestOutcome::BodyUnavailable
                    }
                    FetchFailureKind::Other => {
                        tracing::error!(url = %capture.url(), "body fetch failed: {}", e);
                        RequestOutcome::BodyFetchFailed
                    }
                };
            }
        };
        if !still_queued {
            tracing::debug!(url = %capture.url(), "late body dropped");
            return RequestOutcome::Discarded;
        }
        if body.is_empty() {
            tracing::debug!(url = %capture.url(), "empty body dropped");
            return RequestOutcome::Discarded;
        }

        let settings = match self.inner.store.load().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!(url = %capture.url(), "settings load failed, body dropped: {}", e);
                return RequestOutcome::Discarded;
            }
        };
        match decide(&capture.response, &settings.rules()) {
            Decision::Ignore(reason) => {
                tracing::debug!(url = %capture.url(), "skipped at body-ready: {}", reason);
                RequestOutcome::Discarded
            }
            Decision::AutoSave => self.auto_save(&capture, &settings, &body).await,
            Decision::Stage => {
                self.stage(CapturedItem::new(
                    capture.url(),
                    format_body(&body),
                    capture.queued_at,
                ))
                .await;
                RequestOutcome::Staged
            }
        }
    }

    async fn auto_save(
        &self,
        capture: &PendingCapture,
        settings: &Settings,
        body: &str,
    ) -> RequestOutcome {
        let content = format_body(body);
        let filename = download_filename(capture.url(), capture.queued_at, &settings.filename_prefix);
        match self.inner.sink.download(&content, &filename).await {
            Ok(id) => {
                tracing::info!(url = %capture.url(), %filename, "auto-saved");
                self.notify(Notice::Downloaded {
                    url: capture.url().to_string(),
                    filename,
                    id,
                });
                RequestOutcome::AutoDownloaded(id)
            }
            Err(e) => {
                tracing::error!(url = %capture.url(), "auto-save failed, staging instead: {}", e);
                self.stage(CapturedItem::new(capture.url(), content, capture.queued_at))
                    .await;
                RequestOutcome::Staged
            }
        }
    }

    async fn stage(&self, item: CapturedItem) {
        let url = item.url.clone();
        let mut staging = self.inner.staging.lock().await;
        for evicted in staging.append(item) {
            tracing::debug!(url = %evicted.url, "evicted from staging list");
        }
        tracing::info!(%url, staged = staging.len(), "staged");
        self.persist_locked(&mut staging).await;
    }

    /// Persist the (already locked) staging list and announce the result.
    pub(super) async fn persist_locked(&self, staging: &mut StagingList) -> PersistOutcome {
        let outcome =
            persist_with_recovery(self.inner.store.as_ref(), staging, self.inner.options.emergency_keep)
                .await;
        match &outcome {
            PersistOutcome::Saved => {}
            PersistOutcome::Trimmed { dropped } => self.notify(Notice::StorageTrimmed {
                kept: staging.len(),
                dropped: *dropped,
            }),
            PersistOutcome::Cleared { dropped } => {
                self.notify(Notice::StorageCleared { dropped: *dropped })
            }
            PersistOutcome::Failed(message) => self.notify(Notice::StorageFailed(message.clone())),
        }
        self.notify(Notice::ListUpdated(staging.to_vec()));
        outcome
    }

    pub(super) async fn prefix(&self) -> Result<String, StoreError> {
        Ok(self.inner.store.load().await?.filename_prefix)
    }

    pub(super) async fn save_item(&self, item: &CapturedItem, prefix: &str) -> Option<DownloadId> {
        let filename = download_filename(&item.url, item.captured_at, prefix);
        match self.inner.sink.download(&item.content, &filename).await {
            Ok(id) => {
                tracing::info!(url = %item.url, %filename, "downloaded");
                self.notify(Notice::Downloaded {
                    url: item.url.clone(),
                    filename,
                    id,
                });
                Some(id)
            }
            Err(e) => {
                tracing::error!(url = %item.url, "download failed: {}", e);
                None
            }
        }
    }
}

fn record_joined(
    summary: &mut SessionSummary,
    joined: Result<RequestOutcome, tokio::task::JoinError>,
) {
    match joined {
        Ok(outcome) => summary.record(&outcome),
        Err(e) => tracing::error!("capture task failed: {}", e),
    }
}
