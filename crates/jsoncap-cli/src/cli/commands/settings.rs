//! `jsoncap mode`, `smart-filter`, `prefix`, `record`.

use anyhow::Result;
use jsoncap_core::filter::Mode;
use jsoncap_core::settings::{SettingsPatch, SettingsStore};

use crate::cli::AppContext;

pub async fn run_mode(ctx: &AppContext, mode: Mode) -> Result<()> {
    ctx.store
        .apply(SettingsPatch {
            mode: Some(mode),
            ..SettingsPatch::default()
        })
        .await?;
    println!("mode set to {}", format!("{mode:?}").to_lowercase());
    Ok(())
}

pub async fn run_smart_filter(ctx: &AppContext, on: bool) -> Result<()> {
    ctx.store
        .apply(SettingsPatch {
            smart_filter: Some(on),
            ..SettingsPatch::default()
        })
        .await?;
    println!("smart filter {}", if on { "on" } else { "off" });
    Ok(())
}

pub async fn run_prefix(ctx: &AppContext, value: String) -> Result<()> {
    let value = value.trim().to_string();
    let shown = if value.is_empty() {
        "cleared".to_string()
    } else {
        format!("set to {value}")
    };
    ctx.store
        .apply(SettingsPatch {
            filename_prefix: Some(value),
            ..SettingsPatch::default()
        })
        .await?;
    println!("filename prefix {shown}");
    Ok(())
}

pub async fn run_record(ctx: &AppContext, on: bool) -> Result<()> {
    ctx.store.apply(SettingsPatch::recording(on)).await?;
    println!("recording flag {}", if on { "on" } else { "off" });
    Ok(())
}
