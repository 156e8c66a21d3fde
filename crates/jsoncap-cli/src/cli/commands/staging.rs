//! `jsoncap download`, `download-all`, `clear`.

use anyhow::Result;
use jsoncap_core::control::ControlMessage;

use super::report;
use crate::cli::AppContext;

pub async fn run_download(ctx: &AppContext, index: usize) -> Result<()> {
    let coordinator = ctx.coordinator(None).await?;
    report(
        coordinator
            .handle_control(ControlMessage::DownloadOne { index })
            .await,
    )
}

pub async fn run_download_all(ctx: &AppContext) -> Result<()> {
    let coordinator = ctx.coordinator(None).await?;
    report(coordinator.handle_control(ControlMessage::DownloadAll).await)
}

pub async fn run_clear(ctx: &AppContext) -> Result<()> {
    let coordinator = ctx.coordinator(None).await?;
    report(coordinator.handle_control(ControlMessage::ClearList).await)
}
