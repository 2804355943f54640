//! Catalog of installable extensions for display

use modroute_common::vfs::Vfs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::crawler::{FileTreeNode, crawl};
use super::loader::ManifestLoader;

/// Suffixes that mark a single-file extension
pub const SINGLE_FILE_SUFFIXES: [&str; 2] = [".toml", ".json"];

/// Display metadata of one installed extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Identifier to put in the enabled list
    pub key: String,
}

/// Installed extensions keyed by identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl ExtensionCatalog {
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Discover every loadable extension under the loader's extensions directory
///
/// A missing extensions directory means nothing is installed. Entries that
/// fail to load are left out.
pub fn enumerate(vfs: &dyn Vfs, loader: &ManifestLoader) -> ExtensionCatalog {
    let dir = loader.extensions_dir();
    let listing = match crawl(vfs, dir, false) {
        Ok(listing) => listing,
        Err(e) => {
            info!("No extensions available in {:?}: {}", dir, e);
            return ExtensionCatalog::default();
        }
    };

    let mut entries = BTreeMap::new();
    for (name, node) in listing {
        let candidate = match node {
            FileTreeNode::Dir(_) => true,
            FileTreeNode::File => SINGLE_FILE_SUFFIXES.iter().any(|s| name.ends_with(s)),
        };
        if !candidate {
            debug!("Ignoring {:?} in extensions directory", name);
            continue;
        }

        if let Ok(descriptor) = loader.load(&name) {
            entries.insert(
                name.clone(),
                CatalogEntry {
                    label: descriptor.display_title().to_string(),
                    desc: descriptor.desc.clone(),
                    key: name,
                },
            );
        }
    }

    info!("Found {} installable extension(s)", entries.len());
    ExtensionCatalog { entries }
}
