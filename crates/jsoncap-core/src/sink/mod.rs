//! Download sink: where saved bodies go.

mod dir;

pub use dir::DirDownloadSink;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Identifier the sink assigns to a finished download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DownloadId(pub u64);

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("unusable filename: {0:?}")]
    InvalidFilename(String),
    #[error("download io: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn download(&self, content: &str, filename: &str) -> Result<DownloadId, DownloadError>;
}
