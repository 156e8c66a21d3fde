//! `jsoncap replay` – run a HAR file through the capture pipeline.

use anyhow::{Context, Result};
use jsoncap_core::capture::Notice;
use jsoncap_core::har::HarReplay;
use jsoncap_core::settings::{SettingsPatch, SettingsStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cli::AppContext;

const EVENT_BUFFER: usize = 64;

pub async fn run_replay(ctx: &AppContext, path: &Path, out: Option<PathBuf>) -> Result<()> {
    let replay = Arc::new(HarReplay::from_path(path)?);
    let coordinator = ctx.coordinator(out).await?;

    let mut notices = coordinator.subscribe();
    let printer = tokio::spawn(async move {
        let mut saved = Vec::new();
        loop {
            match notices.recv().await {
                Ok(Notice::Downloaded { filename, .. }) => saved.push(filename),
                Ok(Notice::StorageTrimmed { kept, dropped }) => {
                    eprintln!("storage full: kept {kept} most recent, dropped {dropped}")
                }
                Ok(Notice::StorageCleared { dropped }) => {
                    eprintln!("storage full: staging list cleared ({dropped} dropped)")
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
        saved
    });

    ctx.store.apply(SettingsPatch::recording(true)).await?;
    coordinator.start(replay.clone());

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let events = replay.events();
    let feeder = tokio::spawn(async move {
        for event in events {
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });
    let summary = coordinator.run(rx).await;
    feeder.await.context("event feeder")?;

    let leftover = coordinator.stop();
    ctx.store.apply(SettingsPatch::recording(false)).await?;
    let staged = coordinator.staged().await.len();
    drop(coordinator);
    let saved = printer.await.context("notice printer")?;

    for filename in &saved {
        println!("saved {filename}");
    }
    println!(
        "{} entries: {} saved, {} staged, {} ignored, {} without body, {} failed",
        replay.len(),
        summary.auto_downloaded,
        summary.staged,
        summary.ignored,
        summary.unavailable,
        summary.failed
    );
    println!("staging list: {staged} item(s)");
    if leftover > 0 {
        tracing::debug!(leftover, "pending captures dropped at end of replay");
    }
    Ok(())
}
