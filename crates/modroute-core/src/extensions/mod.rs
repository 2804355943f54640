//! Extension system for modroute
//!
//! This module loads extension descriptors, merges their routes into a
//! priority-ordered route table and exposes the catalog and UI hooks of
//! installed extensions.

pub mod assets;
pub mod catalog;
pub mod crawler;
pub mod descriptor;
pub mod hooks;
pub mod loader;
pub mod manager;
pub mod protocol;
pub mod resolver;
pub mod routes;
pub mod virtual_url;

pub use assets::{AssetBase, DirectoryAssets};
pub use catalog::{CatalogEntry, ExtensionCatalog};
pub use descriptor::ExtensionDescriptor;
pub use hooks::{ArchiveEdit, HookSet, UiHook};
pub use loader::{DescriptorLoader, FailureEscalation, FileDescriptorLoader, ManifestLoader};
pub use manager::ModManager;
pub use protocol::{CatalogClient, CatalogHost, GET_AVAILABLE_MODS, catalog_channel};
pub use resolver::AssetResolver;
pub use routes::{RouteTable, RouteTableBuilder};
