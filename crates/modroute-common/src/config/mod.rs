//! Configuration module
//!
//! Handles loading and discovery of modroute configuration files (modroute.toml, modroute.json).

pub mod model;

use anyhow::Context;
use std::path::{Path, PathBuf};

pub use self::model::*;

/// File names checked by [`discover_config`], in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["modroute.toml", "modroute.json"];

impl ModrouteConfig {
    /// Load configuration from a file path
    ///
    /// Relative `asset_dir`, settings and log paths are taken relative to the
    /// directory containing the configuration file.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        // Detect format based on extension
        let mut config: ModrouteConfig = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {:?}", path))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {:?}", path))?
        };

        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    /// Load the configuration discovered from `start_dir`, or defaults if none exists
    pub fn discover_or_default(start_dir: &Path) -> crate::Result<Self> {
        match discover_config(start_dir) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    fn rebase(&mut self, base: &Path) {
        self.assets.asset_dir = resolve_relative(base, &self.assets.asset_dir);
        if let Some(path) = self.settings.path.as_mut() {
            *path = resolve_relative(base, path);
        }
        if let Some(dir) = self.logging.dir.as_mut() {
            *dir = resolve_relative(base, dir);
        }
    }
}

fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Walk up directory tree to find modroute.toml or modroute.json
pub fn discover_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        for name in CONFIG_FILE_NAMES {
            let candidate = current.join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }

        // Move up one directory
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    None
}
