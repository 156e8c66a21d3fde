//! `jsoncap export` and `jsoncap import`.

use anyhow::{Context, Result};
use chrono::Utc;
use jsoncap_core::settings::transfer::{export_file_name, export_rules, import_patch};
use jsoncap_core::settings::SettingsStore;
use std::path::{Path, PathBuf};

use crate::cli::AppContext;

pub async fn run_export(ctx: &AppContext, path: Option<PathBuf>) -> Result<()> {
    let path = export_to(ctx.store.as_ref(), path).await?;
    println!("exported rules to {}", path.display());
    Ok(())
}

pub async fn run_import(ctx: &AppContext, path: &Path) -> Result<()> {
    let (whitelist, blacklist) = import_from(ctx.store.as_ref(), path).await?;
    if let Some(n) = whitelist {
        println!("whitelist replaced ({n} entries)");
    }
    if let Some(n) = blacklist {
        println!("blacklist replaced ({n} entries)");
    }
    Ok(())
}

async fn export_to<S: SettingsStore + ?Sized>(store: &S, path: Option<PathBuf>) -> Result<PathBuf> {
    let now = Utc::now();
    let settings = store.load().await?;
    let path = path.unwrap_or_else(|| PathBuf::from(export_file_name(now)));
    let json = serde_json::to_string_pretty(&export_rules(&settings, now))?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Returns the sizes of the lists that were replaced.
async fn import_from<S: SettingsStore + ?Sized>(
    store: &S,
    path: &Path,
) -> Result<(Option<usize>, Option<usize>)> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    let patch = import_patch(&json).with_context(|| format!("import {}", path.display()))?;
    let counts = (
        patch.whitelist.as_ref().map(Vec::len),
        patch.blacklist.as_ref().map(Vec::len),
    );
    store.apply(patch).await?;
    Ok(counts)
}
