use crate::sink::DownloadId;
use crate::staging::CapturedItem;

/// Best-effort updates for whoever renders the staging list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The staging list changed; carries the full list, oldest first.
    ListUpdated(Vec<CapturedItem>),
    Downloaded {
        url: String,
        filename: String,
        id: DownloadId,
    },
    /// Quota exhausted; the list was cut to the `kept` most recent items.
    StorageTrimmed { kept: usize, dropped: usize },
    /// Quota exhausted even after trimming; the list was emptied.
    StorageCleared { dropped: usize },
    StorageFailed(String),
}
