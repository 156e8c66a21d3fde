//! CLI for jsoncap: the UI layer over the capture pipeline.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use jsoncap_core::capture::{Coordinator, CoordinatorOptions};
use jsoncap_core::config::{self, JsoncapConfig};
use jsoncap_core::filter::Mode;
use jsoncap_core::settings::FileSettingsStore;
use jsoncap_core::sink::DirDownloadSink;
use std::path::PathBuf;
use std::sync::Arc;

use commands::{
    run_allow, run_blacklist, run_block, run_clear, run_download, run_download_all, run_export,
    run_import, run_list, run_mode, run_prefix, run_record, run_replay, run_smart_filter,
    run_status, run_whitelist,
};

/// Top-level CLI for jsoncap.
#[derive(Debug, Parser)]
#[command(name = "jsoncap")]
#[command(about = "jsoncap: capture JSON responses from recorded network traffic", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Replay a HAR file through the capture pipeline.
    Replay {
        /// Path to the HAR file.
        path: PathBuf,
        /// Save auto-downloads here instead of the configured directory.
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Show recording state, filter settings and staging list size.
    Status,

    /// List staged captures.
    List,

    /// Download one staged capture by index and remove it from the list.
    Download {
        /// Index as shown by `list`.
        index: usize,
    },

    /// Download every staged capture.
    DownloadAll,

    /// Drop every staged capture without downloading.
    Clear,

    /// Blacklist a url's path and purge matching staged captures.
    Block { url: String },

    /// Whitelist a url's path and purge matching staged captures.
    Allow {
        url: String,
        /// Note stored with the whitelist entry.
        #[arg(long, default_value = "")]
        memo: String,
    },

    /// Set the capture mode.
    Mode { mode: ModeArg },

    /// Turn the noise filter on or off.
    SmartFilter { state: Toggle },

    /// Set the download filename prefix (empty string clears it).
    Prefix { value: String },

    /// Set the persisted recording flag.
    Record { state: Toggle },

    /// Edit the whitelist.
    Whitelist {
        #[command(subcommand)]
        action: WhitelistAction,
    },

    /// Edit the blacklist.
    Blacklist {
        #[command(subcommand)]
        action: BlacklistAction,
    },

    /// Export whitelist and blacklist to a JSON file.
    Export {
        /// Output file (default: jsoncap_settings_<date>.json in the current directory).
        path: Option<PathBuf>,
    },

    /// Import whitelist and/or blacklist from an exported JSON file.
    Import { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Auto,
    Manual,
}

impl From<ModeArg> for Mode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Auto => Mode::Auto,
            ModeArg::Manual => Mode::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Toggle::On
    }
}

#[derive(Debug, Subcommand)]
pub enum WhitelistAction {
    Add {
        keyword: String,
        #[arg(long, default_value = "")]
        memo: String,
    },
    Remove { keyword: String },
    /// Change an entry's keyword and/or memo in place.
    Edit {
        keyword: String,
        /// New keyword for the entry.
        #[arg(long, value_name = "KEYWORD")]
        rename: Option<String>,
        /// New memo (empty string clears it).
        #[arg(long)]
        memo: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum BlacklistAction {
    Add { keyword: String },
    Remove { keyword: String },
    /// Rename a keyword in place.
    Edit { keyword: String, new_keyword: String },
}

/// Config plus the opened settings store, shared by every command.
pub struct AppContext {
    pub cfg: JsoncapConfig,
    pub store: Arc<FileSettingsStore>,
}

impl AppContext {
    pub async fn open(cfg: JsoncapConfig) -> Result<Self> {
        let state_file = cfg.state_file()?;
        let store = FileSettingsStore::open(&state_file, Some(cfg.storage_quota_bytes))
            .await
            .with_context(|| format!("open settings at {}", state_file.display()))?;
        Ok(Self {
            cfg,
            store: Arc::new(store),
        })
    }

    /// Coordinator saving into `download_dir` (or the configured one).
    pub async fn coordinator(&self, download_dir: Option<PathBuf>) -> Result<Coordinator> {
        let dir = match download_dir {
            Some(dir) => dir,
            None => self.cfg.download_dir()?,
        };
        let sink = Arc::new(DirDownloadSink::new(dir));
        let coordinator = Coordinator::open(
            self.store.clone(),
            sink,
            CoordinatorOptions::from(&self.cfg),
        )
        .await?;
        Ok(coordinator)
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let ctx = AppContext::open(cfg).await?;

        match cli.command {
            CliCommand::Replay { path, out } => run_replay(&ctx, &path, out).await?,
            CliCommand::Status => run_status(&ctx).await?,
            CliCommand::List => run_list(&ctx).await?,
            CliCommand::Download { index } => run_download(&ctx, index).await?,
            CliCommand::DownloadAll => run_download_all(&ctx).await?,
            CliCommand::Clear => run_clear(&ctx).await?,
            CliCommand::Block { url } => run_block(&ctx, url).await?,
            CliCommand::Allow { url, memo } => run_allow(&ctx, url, memo).await?,
            CliCommand::Mode { mode } => run_mode(&ctx, mode.into()).await?,
            CliCommand::SmartFilter { state } => run_smart_filter(&ctx, state.is_on()).await?,
            CliCommand::Prefix { value } => run_prefix(&ctx, value).await?,
            CliCommand::Record { state } => run_record(&ctx, state.is_on()).await?,
            CliCommand::Whitelist { action } => run_whitelist(&ctx, action).await?,
            CliCommand::Blacklist { action } => run_blacklist(&ctx, action).await?,
            CliCommand::Export { path } => run_export(&ctx, path).await?,
            CliCommand::Import { path } => run_import(&ctx, &path).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
