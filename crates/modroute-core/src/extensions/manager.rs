//! Entry point for embedding applications
//!
//! [`ModManager`] wires the settings store, descriptor loader, route resolver
//! and catalog together. Changing the enabled list through it invalidates the
//! route table, so the next lookup sees the change.

use modroute_common::config::ModrouteConfig;
use modroute_common::settings::{JsonSettingsStore, SettingsStore};
use modroute_common::vfs::{OsVfs, Vfs};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::assets::DirectoryAssets;
use super::catalog::{ExtensionCatalog, enumerate};
use super::descriptor::ExtensionDescriptor;
use super::hooks::{self, HookSet};
use super::loader::ManifestLoader;
use super::protocol::{CatalogClient, CatalogHost, catalog_channel};
use super::resolver::AssetResolver;
use super::routes::{RouteTable, RouteTableBuilder};
use crate::error::{ManifestError, Result};

pub struct ModManager {
    settings: Arc<dyn SettingsStore>,
    resolver: AssetResolver,
    catalog: ExtensionCatalog,
}

impl ModManager {
    /// Manager over the real filesystem and the configured settings file
    pub fn from_config(config: &ModrouteConfig) -> Self {
        let settings = JsonSettingsStore::new(config.settings.resolved_path());
        Self::new(Arc::new(OsVfs), Arc::new(settings), config)
    }

    pub fn new(vfs: Arc<dyn Vfs>, settings: Arc<dyn SettingsStore>, config: &ModrouteConfig) -> Self {
        let loader = ManifestLoader::with_vfs(
            vfs.clone(),
            config.extensions_dir(),
            config.assets.entry_file.clone(),
        );
        Self::with_loader(vfs, settings, config, loader)
    }

    /// Manager using a custom descriptor loader
    pub fn with_loader(
        vfs: Arc<dyn Vfs>,
        settings: Arc<dyn SettingsStore>,
        config: &ModrouteConfig,
        loader: ManifestLoader,
    ) -> Self {
        let catalog = enumerate(vfs.as_ref(), &loader);
        let assets = DirectoryAssets::new(
            vfs.clone(),
            config.assets.asset_dir.clone(),
            loader.extensions_dir().to_path_buf(),
        );
        let builder = RouteTableBuilder::new(vfs, loader, Arc::new(assets));

        Self {
            settings: settings.clone(),
            resolver: AssetResolver::new(builder, settings),
            catalog,
        }
    }

    /// Physical URL for `virtual_url`, or `None` to use the default asset
    pub fn resolve(&mut self, virtual_url: &str) -> Result<Option<String>> {
        self.resolver.resolve(virtual_url)
    }

    pub fn route_table(&mut self) -> Result<Arc<RouteTable>> {
        self.resolver.table()
    }

    /// Rebuild the route table now instead of on the next lookup
    pub fn rebuild(&mut self) -> Result<Arc<RouteTable>> {
        self.resolver.rebuild()
    }

    pub fn invalidate(&mut self) {
        self.resolver.invalidate();
    }

    /// Extensions disabled by the last fatal route build, if any
    pub fn disabled(&self) -> &[String] {
        self.resolver.disabled()
    }

    /// Installed extensions, as enumerated when the manager was created
    pub fn catalog(&self) -> &ExtensionCatalog {
        &self.catalog
    }

    /// Host/client pair serving a snapshot of the catalog
    pub fn catalog_channel(&self) -> (CatalogHost, CatalogClient) {
        catalog_channel(self.catalog.clone())
    }

    /// Enabled extension identifiers as stored, highest priority first
    pub fn enabled_extensions(&self) -> Result<Vec<String>> {
        Ok(self.settings.enabled_extensions()?)
    }

    /// Replace the enabled list and invalidate the route table
    pub fn set_enabled_extensions(&mut self, ids: &[String]) -> Result<()> {
        self.settings.set_enabled_extensions(ids)?;
        self.resolver.invalidate();
        Ok(())
    }

    /// Enable `id` at `priority` (0 is highest), or last when `None`
    ///
    /// An already enabled extension is moved.
    pub fn enable(&mut self, id: &str, priority: Option<usize>) -> Result<()> {
        let mut enabled = self.enabled_extensions()?;
        enabled.retain(|e| e != id);
        let index = priority.map_or(enabled.len(), |p| p.min(enabled.len()));
        enabled.insert(index, id.to_string());
        info!("Enabling extension '{}' at priority {}", id, index);
        self.set_enabled_extensions(&enabled)
    }

    /// Disable `id`; returns whether it was enabled
    pub fn disable(&mut self, id: &str) -> Result<bool> {
        let mut enabled = self.enabled_extensions()?;
        let before = enabled.len();
        enabled.retain(|e| e != id);
        if enabled.len() == before {
            return Ok(false);
        }
        info!("Disabling extension '{}'", id);
        self.set_enabled_extensions(&enabled)?;
        Ok(true)
    }

    /// Disable every extension
    pub fn clear(&mut self) -> Result<()> {
        self.settings.clear_enabled_extensions()?;
        self.resolver.invalidate();
        Ok(())
    }

    /// Load the descriptor of any installed extension
    pub fn info(&self, id: &str) -> std::result::Result<ExtensionDescriptor, ManifestError> {
        self.resolver.builder().loader().load(id)
    }

    /// Descriptors behind the current route table, highest priority first
    ///
    /// Extensions that fail to load are left out, as they are from the table.
    pub fn enabled_descriptors(&mut self) -> Result<Vec<ExtensionDescriptor>> {
        self.resolver.table()?;
        let loader = self.resolver.builder().loader();
        let descriptors: Vec<_> = self
            .resolver
            .enabled()
            .iter()
            .filter_map(|id| loader.load(id).ok())
            .collect();
        debug!("{} enabled descriptor(s) loaded", descriptors.len());
        Ok(descriptors)
    }

    /// Stylesheet URLs to inject, highest priority first
    pub fn styles(&mut self) -> Result<Vec<String>> {
        let descriptors = self.enabled_descriptors()?;
        Ok(hooks::styles(&descriptors)?)
    }

    /// Component hook sets, lowest priority first
    pub fn hook_sets(&mut self) -> Result<Vec<HookSet>> {
        let descriptors = self.enabled_descriptors()?;
        Ok(hooks::hook_sets(&descriptors))
    }

    /// Run every enabled extension's edits over `archive`
    pub fn edit_archive(&mut self, archive: Value) -> Result<Value> {
        let descriptors = self.enabled_descriptors()?;
        Ok(hooks::edit_archive(&descriptors, archive)?)
    }
}
