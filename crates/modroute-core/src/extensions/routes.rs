//! Route table construction
//!
//! Enabled extensions are walked lowest priority first so that every later
//! write, coming from a higher-priority extension, overwrites what came
//! before. Within one extension tree routes are written before manual routes.

use modroute_common::vfs::Vfs;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::assets::AssetBase;
use super::crawler::{crawl, flatten};
use super::descriptor::ExtensionDescriptor;
use super::loader::ManifestLoader;
use crate::error::{ManifestError, Result, RouteError, RouteFailure};

/// Immutable mapping of virtual URL to physical URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: BTreeMap<String, String>,
}

impl RouteTable {
    pub fn get(&self, virtual_url: &str) -> Option<&str> {
        self.routes.get(virtual_url).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Entries in virtual URL order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.routes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Builds [`RouteTable`]s for an ordered list of enabled extensions
pub struct RouteTableBuilder {
    vfs: Arc<dyn Vfs>,
    loader: ManifestLoader,
    assets: Arc<dyn AssetBase>,
}

impl RouteTableBuilder {
    pub fn new(vfs: Arc<dyn Vfs>, loader: ManifestLoader, assets: Arc<dyn AssetBase>) -> Self {
        Self {
            vfs,
            loader,
            assets,
        }
    }

    pub fn loader(&self) -> &ManifestLoader {
        &self.loader
    }

    /// Build and validate a table for `enabled`, highest priority first
    ///
    /// Extensions that are missing or fail to load are skipped. Structural
    /// violations, crawl failures and unresolvable routes fail the whole build.
    pub fn build(&self, enabled: &[String]) -> Result<RouteTable> {
        let mut routes = BTreeMap::new();
        let mut applied = 0;

        for id in enabled.iter().rev() {
            let descriptor = match self.loader.load(id) {
                Ok(descriptor) => descriptor,
                Err(ManifestError::Structural(violation)) => {
                    return Err(RouteError::Structural(violation));
                }
                Err(e) => {
                    warn!("Skipping extension '{}': {}", id, e);
                    continue;
                }
            };
            self.add_extension(&descriptor, &mut routes)?;
            applied += 1;
        }

        self.validate(&routes)?;
        info!(
            "Built route table: {} route(s) from {} extension(s)",
            routes.len(),
            applied
        );
        Ok(RouteTable { routes })
    }

    fn add_extension(
        &self,
        descriptor: &ExtensionDescriptor,
        routes: &mut BTreeMap<String, String>,
    ) -> Result<()> {
        let root = descriptor.root_url()?;
        let extension_dir = self.loader.extension_dir(&descriptor.id);

        for (tree, target) in &descriptor.trees {
            let tree_dir = extension_dir.join(tree.trim_end_matches('/'));
            let files = crawl(self.vfs.as_ref(), &tree_dir, true).map_err(|source| {
                RouteError::Crawl {
                    id: descriptor.id.clone(),
                    path: tree_dir.clone(),
                    source,
                }
            })?;

            for relative in flatten(&files, "") {
                let physical = descriptor.resolve_tree_file(&root, tree, &relative)?;
                routes.insert(format!("{}{}", target, relative), physical.to_string());
            }
        }

        for (virtual_url, local) in &descriptor.routes {
            let physical = descriptor.resolve_local(&root, local)?;
            routes.insert(virtual_url.clone(), physical.to_string());
        }

        debug!(
            "Applied extension '{}' ({} tree(s), {} route(s))",
            descriptor.id,
            descriptor.trees.len(),
            descriptor.routes.len()
        );
        Ok(())
    }

    fn validate(&self, routes: &BTreeMap<String, String>) -> Result<()> {
        let failures: Vec<RouteFailure> = routes
            .iter()
            .filter_map(|(virtual_url, physical_url)| {
                self.assets
                    .resolve_url(physical_url)
                    .err()
                    .map(|e| RouteFailure {
                        virtual_url: virtual_url.clone(),
                        physical_url: physical_url.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(RouteError::Validation { failures })
        }
    }
}
