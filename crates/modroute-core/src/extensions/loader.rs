//! Extension descriptor loading
//!
//! An identifier is looked up in two forms, in order:
//! 1. package form, `<extensions_dir>/<id>/<entry_file>`
//! 2. single-file form, `<extensions_dir>/<id>`
//!
//! The second form is only tried when the first is *missing*. A package whose
//! descriptor exists but is broken is reported as such and never reinterpreted
//! as a single-file extension.

use modroute_common::vfs::Vfs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};

use super::descriptor::ExtensionDescriptor;
use crate::error::ManifestError;

/// Why a descriptor path could not be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorLoadFailure {
    /// Nothing loadable exists at the path
    NotFound(PathBuf),
    /// Something exists but failed to load
    Invalid { path: PathBuf, message: String },
}

/// Capability that turns a descriptor path into a descriptor
///
/// This is the one place extension content is trusted. Swapping the
/// implementation (e.g. for an isolated loader) leaves route building untouched.
pub trait DescriptorLoader: Send + Sync {
    fn load_descriptor(&self, path: &Path) -> Result<ExtensionDescriptor, DescriptorLoadFailure>;
}

/// Loads TOML or JSON descriptor files through a [`Vfs`]
///
/// The format is picked from the file suffix: `.json` is JSON, anything else is TOML.
pub struct FileDescriptorLoader {
    vfs: Arc<dyn Vfs>,
}

impl FileDescriptorLoader {
    pub fn new(vfs: Arc<dyn Vfs>) -> Self {
        Self { vfs }
    }
}

impl DescriptorLoader for FileDescriptorLoader {
    fn load_descriptor(&self, path: &Path) -> Result<ExtensionDescriptor, DescriptorLoadFailure> {
        if !self.vfs.is_file(path) {
            return Err(DescriptorLoadFailure::NotFound(path.to_path_buf()));
        }

        let invalid = |message: String| DescriptorLoadFailure::Invalid {
            path: path.to_path_buf(),
            message,
        };

        let content = self.vfs.read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DescriptorLoadFailure::NotFound(path.to_path_buf()),
            _ => invalid(e.to_string()),
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| invalid(e.to_string()))
        }
    }
}

/// Receives every terminal descriptor failure before it is returned
pub trait FailureEscalation: Send + Sync {
    fn escalate(&self, error: &ManifestError);
}

/// Escalation that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEscalation;

impl FailureEscalation for LogEscalation {
    fn escalate(&self, error: &ManifestError) {
        error!("Extension load failure: {}", error);
    }
}

impl<F> FailureEscalation for F
where
    F: Fn(&ManifestError) + Send + Sync,
{
    fn escalate(&self, error: &ManifestError) {
        self(error)
    }
}

/// Default descriptor file name inside a package-style extension
pub const DEFAULT_ENTRY_FILE: &str = "mod.toml";

/// Locates and loads extension descriptors by identifier
pub struct ManifestLoader {
    extensions_dir: PathBuf,
    entry_file: String,
    source: Arc<dyn DescriptorLoader>,
    escalation: Arc<dyn FailureEscalation>,
}

impl ManifestLoader {
    /// Create a loader over a custom descriptor source
    pub fn new(
        extensions_dir: PathBuf,
        entry_file: impl Into<String>,
        source: Arc<dyn DescriptorLoader>,
    ) -> Self {
        Self {
            extensions_dir,
            entry_file: entry_file.into(),
            source,
            escalation: Arc::new(LogEscalation),
        }
    }

    /// Create a loader reading descriptor files through `vfs`
    pub fn with_vfs(
        vfs: Arc<dyn Vfs>,
        extensions_dir: PathBuf,
        entry_file: impl Into<String>,
    ) -> Self {
        Self::new(
            extensions_dir,
            entry_file,
            Arc::new(FileDescriptorLoader::new(vfs)),
        )
    }

    /// Replace the failure escalation callback
    pub fn with_escalation(mut self, escalation: Arc<dyn FailureEscalation>) -> Self {
        self.escalation = escalation;
        self
    }

    pub fn extensions_dir(&self) -> &Path {
        &self.extensions_dir
    }

    /// Root directory of a package-style extension
    pub fn extension_dir(&self, id: &str) -> PathBuf {
        self.extensions_dir.join(id)
    }

    /// Load the descriptor for `id`, falling back to the single-file form
    pub fn load(&self, id: &str) -> Result<ExtensionDescriptor, ManifestError> {
        let package_path = self.extension_dir(id).join(&self.entry_file);

        let result = match self.source.load_descriptor(&package_path) {
            Ok(descriptor) => self.finish(id, false, descriptor),
            Err(DescriptorLoadFailure::NotFound(_)) => {
                debug!("{:?} not found, trying single-file extension", package_path);
                self.load_single_file(id)
            }
            Err(DescriptorLoadFailure::Invalid { path, message }) => {
                Err(ManifestError::LoadError {
                    id: id.to_string(),
                    path,
                    message,
                })
            }
        };

        result.inspect_err(|e| self.escalation.escalate(e))
    }

    /// Single-file form only; a missing file comes back as `NotFound` without escalation
    fn load_single_file(&self, id: &str) -> Result<ExtensionDescriptor, ManifestError> {
        let path = self.extensions_dir.join(id);
        match self.source.load_descriptor(&path) {
            Ok(descriptor) => self.finish(id, true, descriptor),
            Err(DescriptorLoadFailure::NotFound(path)) => Err(ManifestError::NotFound {
                id: id.to_string(),
                path,
            }),
            Err(DescriptorLoadFailure::Invalid { path, message }) => {
                Err(ManifestError::LoadError {
                    id: id.to_string(),
                    path,
                    message,
                })
            }
        }
    }

    fn finish(
        &self,
        id: &str,
        single_file: bool,
        mut descriptor: ExtensionDescriptor,
    ) -> Result<ExtensionDescriptor, ManifestError> {
        descriptor.id = id.to_string();
        descriptor.single_file = single_file;
        descriptor.validate()?;
        Ok(descriptor)
    }
}
