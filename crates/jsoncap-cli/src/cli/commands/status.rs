//! `jsoncap status` and `jsoncap list`.

use anyhow::Result;
use jsoncap_core::filter::Mode;
use jsoncap_core::settings::SettingsStore;

use crate::cli::AppContext;

pub async fn run_status(ctx: &AppContext) -> Result<()> {
    let s = ctx.store.load().await?;
    let mode = match s.mode {
        Mode::Auto => "auto",
        Mode::Manual => "manual",
    };
    println!("recording:     {}", if s.is_recording { "on" } else { "off" });
    println!("mode:          {mode}");
    println!("smart filter:  {}", if s.smart_filter { "on" } else { "off" });
    println!(
        "prefix:        {}",
        if s.filename_prefix.is_empty() {
            "-"
        } else {
            s.filename_prefix.as_str()
        }
    );
    println!("whitelist:     {} keyword(s)", s.whitelist.len());
    for w in &s.whitelist {
        if w.memo.is_empty() {
            println!("  {}", w.keyword);
        } else {
            println!("  {}  ({})", w.keyword, w.memo);
        }
    }
    println!("blacklist:     {} keyword(s)", s.blacklist.len());
    for k in &s.blacklist {
        println!("  {k}");
    }
    println!("staged:        {}", s.captured_requests.len());
    println!("settings file: {}", ctx.store.path().display());
    println!("download dir:  {}", ctx.cfg.download_dir()?.display());
    Ok(())
}

pub async fn run_list(ctx: &AppContext) -> Result<()> {
    let items = ctx.store.load().await?.captured_requests;
    if items.is_empty() {
        println!("No staged captures.");
        return Ok(());
    }
    println!("{:<4} {:<10} {:<24} {}", "IDX", "SIZE", "CAPTURED", "URL");
    for (i, item) in items.iter().enumerate() {
        println!(
            "{:<4} {:<10} {:<24} {}",
            i,
            item.size_label,
            item.captured_at.format("%Y-%m-%d %H:%M:%S%.3f"),
            item.url
        );
    }
    Ok(())
}
