//! modroute core - extension-aware virtual asset routing
//!
//! This crate provides:
//! - Descriptor loading with package and single-file extension forms
//! - Route table building with priority override and validation
//! - Cached `asset://` URL resolution with rollback on fatal failures
//! - Catalog enumeration and a request/response channel to share it
//! - Style, UI hook and archive edit contributions of enabled extensions

pub mod error;
pub mod extensions;

pub use error::{ManifestError, Result, RouteError, StructuralViolation};
pub use extensions::{AssetResolver, ExtensionCatalog, ExtensionDescriptor, ModManager, RouteTable};
