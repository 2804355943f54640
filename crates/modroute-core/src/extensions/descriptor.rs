//! Extension descriptor parsing.
//!
//! Each extension ships a descriptor (`mod.toml` inside a package directory,
//! or a lone `<id>.toml` / `<id>.json` file) that defines:
//! - Display metadata (title, description)
//! - Tree routes (directories mirrored under a virtual prefix)
//! - Manual routes (single virtual URLs remapped to extension files)
//! - Stylesheets, UI hooks and archive edits exposed to the host

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;

use super::hooks::{ArchiveEdit, UiHook};
use super::virtual_url::{self, is_virtual};
use crate::error::StructuralViolation;

/// Parsed extension descriptor.
///
/// `id` and `single_file` are stamped by the loader and never read from the
/// descriptor file itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
    /// Directory or file name the extension was loaded from.
    #[serde(skip)]
    pub id: String,

    /// Whether the descriptor came from the single-file form.
    #[serde(skip)]
    pub single_file: bool,

    /// Human-readable display name.
    #[serde(default)]
    pub title: Option<String>,

    /// Short description.
    #[serde(default, alias = "description")]
    pub desc: Option<String>,

    /// Extension directory (ending in `/`) to virtual directory (ending in `/`).
    #[serde(default)]
    pub trees: IndexMap<String, String>,

    /// Virtual URL to a path relative to the extension, or an absolute URL.
    #[serde(default)]
    pub routes: IndexMap<String, String>,

    /// Stylesheet links relative to the extension.
    #[serde(default)]
    pub styles: Vec<String>,

    /// UI component hooks.
    #[serde(default, alias = "vueHooks")]
    pub hooks: Vec<UiHook>,

    /// Archive edits, applied in order.
    #[serde(default)]
    pub edit: Vec<ArchiveEdit>,
}

impl ExtensionDescriptor {
    /// Title for display, falling back to the identifier.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    /// `asset://mods/<id>/`, the base every local path resolves against.
    pub fn root_url(&self) -> Result<Url, StructuralViolation> {
        virtual_url::mod_root_url(&self.id).map_err(|e| StructuralViolation::InvalidUrl {
            id: self.id.clone(),
            path: self.id.clone(),
            message: e.to_string(),
        })
    }

    /// Resolve a path declared by this extension against its root URL.
    pub fn resolve_local(&self, root: &Url, path: &str) -> Result<Url, StructuralViolation> {
        virtual_url::resolve(root, path).map_err(|e| StructuralViolation::InvalidUrl {
            id: self.id.clone(),
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Physical URL of a crawled file inside one of this extension's trees.
    ///
    /// `relative` is a file path, not a URL reference, so its segments are
    /// encoded rather than parsed.
    pub fn resolve_tree_file(
        &self,
        root: &Url,
        tree: &str,
        relative: &str,
    ) -> Result<Url, StructuralViolation> {
        let dir = self.resolve_local(root, tree)?;
        virtual_url::append_segments(&dir, relative).ok_or_else(|| {
            StructuralViolation::InvalidUrl {
                id: self.id.clone(),
                path: format!("{}{}", tree, relative),
                message: "tree URL cannot hold path segments".to_string(),
            }
        })
    }

    /// Check the structural rules every descriptor must satisfy.
    pub fn validate(&self) -> Result<(), StructuralViolation> {
        let root = self.root_url()?;

        if self.single_file && !self.trees.is_empty() {
            return Err(StructuralViolation::SingleFileTrees {
                id: self.id.clone(),
            });
        }

        for (tree, target) in &self.trees {
            for path in [tree, target] {
                if !path.ends_with('/') {
                    return Err(StructuralViolation::TreeNotDirectory {
                        id: self.id.clone(),
                        path: path.clone(),
                    });
                }
            }
            if !is_virtual(target) {
                return Err(StructuralViolation::NotVirtual {
                    id: self.id.clone(),
                    path: target.clone(),
                });
            }
        }

        for (route, local) in &self.routes {
            if !is_virtual(route) {
                return Err(StructuralViolation::NotVirtual {
                    id: self.id.clone(),
                    path: route.clone(),
                });
            }
            let url = self.resolve_local(&root, local)?;
            if url.scheme() == root.scheme() && !is_virtual(url.as_str()) {
                return Err(StructuralViolation::NotVirtual {
                    id: self.id.clone(),
                    path: local.clone(),
                });
            }
            // A single-file extension has no directory for local paths to point into.
            if self.single_file && url.as_str().starts_with(root.as_str()) {
                return Err(StructuralViolation::SingleFileLocalRoute {
                    id: self.id.clone(),
                    route: route.clone(),
                    url: url.to_string(),
                });
            }
        }

        for hook in &self.hooks {
            if let Some(pattern) = &hook.match_pattern {
                glob::Pattern::new(pattern).map_err(|e| {
                    StructuralViolation::InvalidHookPattern {
                        id: self.id.clone(),
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    }
                })?;
            }
        }

        Ok(())
    }
}
