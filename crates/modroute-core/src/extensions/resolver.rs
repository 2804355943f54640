//! Cached virtual URL resolution

use modroute_common::settings::SettingsStore;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::routes::{RouteTable, RouteTableBuilder};
use super::virtual_url::is_virtual;
use crate::error::Result;

/// Resolves virtual URLs against a lazily built [`RouteTable`]
///
/// The table is built on first use and kept until [`AssetResolver::invalidate`]
/// is called. A fatal build failure disables every extension, installs the
/// table for the empty list, and returns the original error.
pub struct AssetResolver {
    builder: RouteTableBuilder,
    settings: Arc<dyn SettingsStore>,
    table: Option<Arc<RouteTable>>,
    built_for: Vec<String>,
    disabled: Vec<String>,
}

impl AssetResolver {
    pub fn new(builder: RouteTableBuilder, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            builder,
            settings,
            table: None,
            built_for: Vec::new(),
            disabled: Vec::new(),
        }
    }

    /// Physical URL overriding `virtual_url`, if any extension provides one
    ///
    /// `None` means the caller should fall back to its default resolution.
    pub fn resolve(&mut self, virtual_url: &str) -> Result<Option<String>> {
        debug_assert!(
            is_virtual(virtual_url),
            "resolve called with non-virtual URL {}",
            virtual_url
        );
        let table = self.table()?;
        let physical = table.get(virtual_url).map(str::to_string);
        debug!("Resolved {} -> {:?}", virtual_url, physical);
        Ok(physical)
    }

    /// Current table, building it first if needed
    pub fn table(&mut self) -> Result<Arc<RouteTable>> {
        match &self.table {
            Some(table) => Ok(table.clone()),
            None => self.rebuild(),
        }
    }

    /// Drop the cached table; the next lookup rebuilds it
    pub fn invalidate(&mut self) {
        if self.table.take().is_some() {
            debug!("Route table invalidated");
        }
    }

    pub fn builder(&self) -> &RouteTableBuilder {
        &self.builder
    }

    pub fn is_built(&self) -> bool {
        self.table.is_some()
    }

    /// Enabled list the current table was built from
    pub fn enabled(&self) -> &[String] {
        &self.built_for
    }

    /// Extensions the last rebuild disabled after a fatal failure
    ///
    /// Empty when the last rebuild succeeded, or when clearing the settings
    /// store failed and nothing was actually disabled.
    pub fn disabled(&self) -> &[String] {
        &self.disabled
    }

    /// Build a fresh table from the settings store now
    pub fn rebuild(&mut self) -> Result<Arc<RouteTable>> {
        let enabled = self.settings.enabled_extensions()?;
        info!("Building routes for {} enabled extension(s)", enabled.len());
        self.disabled.clear();

        match self.builder.build(&enabled) {
            Ok(table) => Ok(self.install(table, enabled)),
            Err(err) => {
                error!(
                    "Route build failed, disabling extensions {:?}: {}",
                    enabled, err
                );
                match self.settings.clear_enabled_extensions() {
                    Ok(()) => self.disabled = enabled,
                    Err(clear_err) => {
                        warn!("Could not disable extensions: {:#}", clear_err);
                    }
                }
                // Nothing to load or validate for the empty list
                let fallback = self.builder.build(&[]).unwrap_or_default();
                self.install(fallback, Vec::new());
                Err(err)
            }
        }
    }

    fn install(&mut self, table: RouteTable, enabled: Vec<String>) -> Arc<RouteTable> {
        let table = Arc::new(table);
        self.table = Some(table.clone());
        self.built_for = enabled;
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RouteError, StructuralViolation};
    use crate::extensions::assets::DirectoryAssets;
    use crate::extensions::loader::{DEFAULT_ENTRY_FILE, ManifestLoader};
    use modroute_common::settings::MemorySettingsStore;
    use modroute_common::vfs::{MemoryVfs, Vfs};
    use std::path::PathBuf;

    fn resolver(vfs: MemoryVfs, enabled: &[&str]) -> (AssetResolver, Arc<MemorySettingsStore>) {
        let vfs: Arc<dyn Vfs> = Arc::new(vfs);
        let loader = ManifestLoader::with_vfs(vfs.clone(), PathBuf::from("/mods"), DEFAULT_ENTRY_FILE);
        let assets = DirectoryAssets::new(vfs.clone(), PathBuf::from("/assets"), PathBuf::from("/mods"));
        let builder = RouteTableBuilder::new(vfs, loader, Arc::new(assets));
        let settings = Arc::new(MemorySettingsStore::new(enabled.iter().copied()));
        (AssetResolver::new(builder, settings.clone()), settings)
    }

    #[test]
    fn test_lazy_build_and_invalidate() {
        let vfs = MemoryVfs::new()
            .with_file("/mods/a/mod.toml", r#"routes = { "asset://x" = "x.png" }"#)
            .with_file("/mods/a/x.png", "");
        let (mut resolver, settings) = resolver(vfs, &["a"]);

        assert!(!resolver.is_built());
        assert_eq!(
            resolver.resolve("asset://x").unwrap().as_deref(),
            Some("asset://mods/a/x.png")
        );
        assert_eq!(resolver.resolve("asset://other").unwrap(), None);
        assert_eq!(resolver.enabled(), ["a".to_string()]);

        // Stale until invalidated
        settings.set_enabled_extensions(&[]).unwrap();
        assert!(resolver.resolve("asset://x").unwrap().is_some());

        resolver.invalidate();
        assert!(!resolver.is_built());
        assert_eq!(resolver.resolve("asset://x").unwrap(), None);
    }

    #[test]
    fn test_fatal_failure_disables_everything() {
        let vfs = MemoryVfs::new()
            .with_file("/mods/good/mod.toml", r#"routes = { "asset://x" = "x.png" }"#)
            .with_file("/mods/good/x.png", "")
            .with_file("/mods/bad.toml", r#"trees = { "a/" = "asset://a/" }"#);
        let (mut resolver, settings) = resolver(vfs, &["good", "bad.toml"]);

        let err = resolver.resolve("asset://x").unwrap_err();
        assert!(matches!(err, RouteError::Structural(_)));

        assert!(settings.enabled_extensions().unwrap().is_empty());
        assert!(resolver.is_built());
        assert!(resolver.enabled().is_empty());
        assert_eq!(resolver.disabled(), ["good".to_string(), "bad.toml".to_string()]);
        assert_eq!(resolver.resolve("asset://x").unwrap(), None);
    }

    /// Settings store whose list cannot be cleared
    struct StuckSettings(MemorySettingsStore);

    impl SettingsStore for StuckSettings {
        fn enabled_extensions(&self) -> modroute_common::Result<Vec<String>> {
            self.0.enabled_extensions()
        }

        fn set_enabled_extensions(&self, ids: &[String]) -> modroute_common::Result<()> {
            self.0.set_enabled_extensions(ids)
        }

        fn clear_enabled_extensions(&self) -> modroute_common::Result<()> {
            anyhow::bail!("settings file is read-only")
        }
    }

    #[test]
    fn test_failed_clear_keeps_the_build_error() {
        let vfs: Arc<dyn Vfs> = Arc::new(
            MemoryVfs::new().with_file("/mods/bad.toml", r#"trees = { "a/" = "asset://a/" }"#),
        );
        let loader = ManifestLoader::with_vfs(vfs.clone(), PathBuf::from("/mods"), DEFAULT_ENTRY_FILE);
        let assets = DirectoryAssets::new(vfs.clone(), PathBuf::from("/assets"), PathBuf::from("/mods"));
        let builder = RouteTableBuilder::new(vfs, loader, Arc::new(assets));
        let settings = Arc::new(StuckSettings(MemorySettingsStore::new(["bad.toml"])));
        let mut resolver = AssetResolver::new(builder, settings.clone());

        let err = resolver.rebuild().unwrap_err();
        assert!(matches!(
            err,
            RouteError::Structural(StructuralViolation::SingleFileTrees { .. })
        ));
        // Nothing was disabled, but lookups still see an empty table
        assert!(resolver.disabled().is_empty());
        assert_eq!(settings.enabled_extensions().unwrap(), ["bad.toml".to_string()]);
        assert!(resolver.is_built());
        assert_eq!(resolver.resolve("asset://a/x").unwrap(), None);
    }
}
