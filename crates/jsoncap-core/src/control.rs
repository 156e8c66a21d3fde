//! Control messages from the UI layer and their replies.
//!
//! Wire format is one JSON object per message, tagged by `action`:
//! `{"action": "downloadOne", "index": 3}`, `{"action": "blockUrl", "url": "..."}`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControlMessage {
    /// Download every staged item.
    DownloadAll,
    /// Download one staged item by index (oldest is 0).
    DownloadOne { index: usize },
    /// Drop every staged item without downloading.
    ClearList,
    /// Blacklist the url's path and purge matching staged items.
    BlockUrl { url: String },
    /// Whitelist the url's path with a memo and purge matching staged items.
    AllowUrl {
        url: String,
        #[serde(default)]
        memo: String,
    },
    GetRecordingStatus,
}

impl ControlMessage {
    /// Parse one wire message.
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ControlReply {
    Ok,
    RecordingStatus {
        #[serde(rename = "isRecording")]
        is_recording: bool,
    },
    /// `count` items were downloaded and removed from the list; `failed` stayed.
    Downloaded { count: usize, failed: usize },
    /// Index out of range.
    NotFound { index: usize },
    /// Block/allow target that is not a parseable url.
    InvalidUrl { url: String },
    /// The request was understood but a collaborator failed.
    Failed { message: String },
}
