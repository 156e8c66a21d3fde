//! Sink that writes each download as a file in one directory.
//!
//! Existing files are never overwritten: a name that is taken gets ` (1)`,
//! ` (2)`, ... inserted before the extension. The body is written to a
//! `.part` file first and only linked under its final name once complete.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;

use super::{DownloadError, DownloadId, DownloadSink};
use crate::filename::{sanitize_for_disk, NAME_MAX};

/// Attempts at finding a free name before giving up.
const MAX_SUFFIX: u32 = 10_000;

pub struct DirDownloadSink {
    dir: PathBuf,
    next_id: AtomicU64,
    next_part: AtomicU64,
}

impl DirDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next_id: AtomicU64::new(1),
            next_part: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn part_path(&self) -> PathBuf {
        let seq = self.next_part.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(".jsoncap-{}-{seq}.part", std::process::id()))
    }

    /// Writes `content` under `name` or the first free numbered variant.
    /// The `.part` file is removed whether or not a name was claimed.
    async fn store(&self, content: &str, name: &str, max_suffix: u32) -> std::io::Result<PathBuf> {
        let part = self.part_path();
        let result = match write_part(&part, content).await {
            Ok(()) => link_free_name(&part, &self.dir, name, max_suffix).await,
            Err(e) => Err(e),
        };
        if let Err(e) = tokio::fs::remove_file(&part).await {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %part.display(), "removing part file failed: {}", e);
            }
        }
        result
    }
}

async fn write_part(part: &Path, content: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(part)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await
}

/// Hard links are created without replacing, so a taken name fails with
/// `AlreadyExists` and the next suffix is tried.
async fn link_free_name(
    part: &Path,
    dir: &Path,
    name: &str,
    max_suffix: u32,
) -> std::io::Result<PathBuf> {
    for n in 0..=max_suffix {
        let candidate = if n == 0 { name.to_string() } else { numbered(name, n) };
        let path = dir.join(&candidate);
        match tokio::fs::hard_link(part, &path).await {
            Ok(()) => return Ok(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free name for {name} in {}", dir.display()),
    ))
}

/// `name.json` → `name (n).json`; names without extension get the suffix at the end.
/// The stem is shortened so the result stays within 255 bytes.
fn numbered(name: &str, n: u32) -> String {
    let (stem, ext) = match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    };
    let suffix = format!(" ({n})");
    let mut take = stem
        .len()
        .min(NAME_MAX.saturating_sub(suffix.len() + ext.len()));
    while !stem.is_char_boundary(take) {
        take -= 1;
    }
    format!("{}{suffix}{ext}", &stem[..take])
}

#[async_trait]
impl DownloadSink for DirDownloadSink {
    async fn download(&self, content: &str, filename: &str) -> Result<DownloadId, DownloadError> {
        let name = sanitize_for_disk(filename)
            .ok_or_else(|| DownloadError::InvalidFilename(filename.to_string()))?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.store(content, &name, MAX_SUFFIX).await?;
        let id = DownloadId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(id = %id, path = %path.display(), "download written");
        Ok(id)
    }
}
