use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration from modroute.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModrouteConfig {
    /// Asset and extension directory layout
    #[serde(default)]
    pub assets: AssetsSection,

    /// Settings store location
    #[serde(default)]
    pub settings: SettingsSection,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSection,
}

impl ModrouteConfig {
    /// Directory holding installed extensions
    pub fn extensions_dir(&self) -> PathBuf {
        self.assets.asset_dir.join(&self.assets.mods_dir)
    }
}

/// [assets] section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsSection {
    /// Root of the base asset tree; `asset://<path>` resolves below it
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,
    /// Extensions directory, relative to `asset_dir`
    #[serde(default = "default_mods_dir")]
    pub mods_dir: String,
    /// Descriptor file name inside a package-style extension
    #[serde(default = "default_entry_file")]
    pub entry_file: String,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            asset_dir: default_asset_dir(),
            mods_dir: default_mods_dir(),
            entry_file: default_entry_file(),
        }
    }
}

pub(crate) fn default_asset_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("modroute").join("assets"))
        .unwrap_or_else(|| PathBuf::from("assets"))
}

pub(crate) fn default_mods_dir() -> String {
    "mods".to_string()
}

pub(crate) fn default_entry_file() -> String {
    "mod.toml".to_string()
}

/// [settings] section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsSection {
    /// Settings document path; defaults to the user config directory
    pub path: Option<PathBuf>,
}

impl SettingsSection {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .map(|d| d.join("modroute"))
                .unwrap_or_else(|| PathBuf::from(".modroute"))
                .join("settings.json")
        })
    }
}

/// [logging] section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for rolling log files
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
