//! Captured item as staged and persisted under `capturedRequests`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedItem {
    pub url: String,
    /// Body as it will be written to disk (pretty-printed when it was json).
    pub content: String,
    #[serde(rename = "timestamp")]
    pub captured_at: DateTime<Utc>,
    #[serde(rename = "size", default)]
    pub size_label: String,
}

impl CapturedItem {
    pub fn new(url: impl Into<String>, content: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        let content = content.into();
        let size_label = size_label(content.len());
        Self {
            url: url.into(),
            content,
            captured_at,
            size_label,
        }
    }
}

/// Human size for the review list: bytes up to 1024, then KB with one decimal.
pub fn size_label(bytes: usize) -> String {
    if bytes > 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
