use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::settings::DEFAULT_QUOTA_BYTES;
use crate::staging::{DEFAULT_CAPACITY, DEFAULT_EMERGENCY_KEEP};

/// Global configuration loaded from `~/.config/jsoncap/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsoncapConfig {
    /// Maximum number of staged items; the oldest are evicted past this.
    pub staging_capacity: usize,
    /// Items kept when the settings store runs out of quota.
    pub emergency_keep: usize,
    /// Byte budget for the serialized settings file.
    pub storage_quota_bytes: u64,
    /// Where downloads land (None = `$XDG_DATA_HOME/jsoncap/downloads`).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Settings file (None = `$XDG_STATE_HOME/jsoncap/settings.json`).
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

impl Default for JsoncapConfig {
    fn default() -> Self {
        Self {
            staging_capacity: DEFAULT_CAPACITY,
            emergency_keep: DEFAULT_EMERGENCY_KEEP,
            storage_quota_bytes: DEFAULT_QUOTA_BYTES,
            download_dir: None,
            state_file: None,
        }
    }
}

impl JsoncapConfig {
    pub fn download_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.download_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("jsoncap")?;
        Ok(xdg_dirs.get_data_home().join("jsoncap").join("downloads"))
    }

    pub fn state_file(&self) -> Result<PathBuf> {
        match &self.state_file {
            Some(path) => Ok(path.clone()),
            None => crate::settings::FileSettingsStore::default_path(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("jsoncap")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<JsoncapConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<JsoncapConfig> {
    if !path.exists() {
        let default_cfg = JsoncapConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg: JsoncapConfig =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}
