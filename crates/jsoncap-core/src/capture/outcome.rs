//! Terminal states of a request and per-session tallies.
//!
//! `Started → {Ignored | Pending} → {Discarded | BodyUnavailable |
//! BodyFetchFailed | AutoDownloaded | Staged}`

use crate::filter::IgnoreReason;
use crate::sink::DownloadId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// No session is running.
    NotRecording,
    /// Rejected by the filter.
    Ignored(IgnoreReason),
    /// Queued in the pending table, waiting for its body.
    Pending,
    /// Body-ready for an id that is not queued (never was, or already handled).
    NotQueued,
    /// Dropped after queueing: stale entry, empty body, late ignore, or store failure.
    Discarded,
    /// The observer had no body for it.
    BodyUnavailable,
    /// Fetching the body failed unexpectedly.
    BodyFetchFailed,
    AutoDownloaded(DownloadId),
    Staged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub ignored: usize,
    pub queued: usize,
    pub not_queued: usize,
    pub discarded: usize,
    pub unavailable: usize,
    pub failed: usize,
    pub auto_downloaded: usize,
    pub staged: usize,
}

impl SessionSummary {
    pub fn record(&mut self, outcome: &RequestOutcome) {
        match outcome {
            RequestOutcome::NotRecording => {}
            RequestOutcome::Ignored(_) => self.ignored += 1,
            RequestOutcome::Pending => self.queued += 1,
            RequestOutcome::NotQueued => self.not_queued += 1,
            RequestOutcome::Discarded => self.discarded += 1,
            RequestOutcome::BodyUnavailable => self.unavailable += 1,
            RequestOutcome::BodyFetchFailed => self.failed += 1,
            RequestOutcome::AutoDownloaded(_) => self.auto_downloaded += 1,
            RequestOutcome::Staged => self.staged += 1,
        }
    }
}
