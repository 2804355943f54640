//! Error types for extension loading and route resolution

use std::path::PathBuf;
use thiserror::Error;

/// Result type for route operations
pub type Result<T> = std::result::Result<T, RouteError>;

/// Classification of a [`ManifestError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestErrorKind {
    /// Neither the package nor the single-file form exists
    NotFound,
    /// A descriptor exists but could not be read or parsed
    LoadError,
    /// The descriptor breaks a structural rule
    Structural,
}

/// Errors from loading a single extension descriptor
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Identifier matches neither a package directory nor a single-file descriptor
    #[error("Extension '{id}' not found (looked for {path:?})")]
    NotFound { id: String, path: PathBuf },

    /// Descriptor found but failed while loading
    #[error("Failed to load extension '{id}' from {path:?}: {message}")]
    LoadError {
        id: String,
        path: PathBuf,
        message: String,
    },

    /// Descriptor loaded but violates a structural invariant
    #[error(transparent)]
    Structural(#[from] StructuralViolation),
}

impl ManifestError {
    pub fn kind(&self) -> ManifestErrorKind {
        match self {
            ManifestError::NotFound { .. } => ManifestErrorKind::NotFound,
            ManifestError::LoadError { .. } => ManifestErrorKind::LoadError,
            ManifestError::Structural(_) => ManifestErrorKind::Structural,
        }
    }

    /// Identifier of the extension that failed
    pub fn extension_id(&self) -> &str {
        match self {
            ManifestError::NotFound { id, .. } | ManifestError::LoadError { id, .. } => id,
            ManifestError::Structural(violation) => violation.extension_id(),
        }
    }
}

/// Extension author errors that invalidate a whole route build
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StructuralViolation {
    #[error("Extension '{id}': single-file extensions cannot declare trees")]
    SingleFileTrees { id: String },

    #[error("Extension '{id}': single-file extensions cannot use local route {route} -> {url}")]
    SingleFileLocalRoute {
        id: String,
        route: String,
        url: String,
    },

    #[error("Extension '{id}': tree path {path:?} must be a directory (end with /)")]
    TreeNotDirectory { id: String, path: String },

    #[error("Extension '{id}': {path:?} must be on the asset:// scheme")]
    NotVirtual { id: String, path: String },

    #[error("Extension '{id}': cannot resolve {path:?}: {message}")]
    InvalidUrl {
        id: String,
        path: String,
        message: String,
    },

    #[error("Extension '{id}': invalid hook pattern {pattern:?}: {message}")]
    InvalidHookPattern {
        id: String,
        pattern: String,
        message: String,
    },
}

impl StructuralViolation {
    pub fn extension_id(&self) -> &str {
        match self {
            StructuralViolation::SingleFileTrees { id }
            | StructuralViolation::SingleFileLocalRoute { id, .. }
            | StructuralViolation::TreeNotDirectory { id, .. }
            | StructuralViolation::NotVirtual { id, .. }
            | StructuralViolation::InvalidUrl { id, .. }
            | StructuralViolation::InvalidHookPattern { id, .. } => id,
        }
    }
}

/// A route whose physical URL failed base-asset resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFailure {
    pub virtual_url: String,
    pub physical_url: String,
    pub reason: String,
}

impl std::fmt::Display for RouteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {}: {}",
            self.virtual_url, self.physical_url, self.reason
        )
    }
}

/// Errors that abort a whole route table build
#[derive(Debug, Error)]
pub enum RouteError {
    /// An enabled extension breaks a structural rule
    #[error(transparent)]
    Structural(#[from] StructuralViolation),

    /// A declared tree could not be crawled
    #[error("Failed to crawl tree {path:?} of extension '{id}': {source}")]
    Crawl {
        id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The built table contains routes that do not resolve
    #[error("{} route(s) failed validation: {}", .failures.len(), join_failures(.failures))]
    Validation { failures: Vec<RouteFailure> },

    /// The settings store could not be read or written
    #[error("Settings error: {0}")]
    Settings(#[from] anyhow::Error),

    /// An enabled extension's archive edit could not be applied
    #[error(transparent)]
    Edit(#[from] EditError),
}

fn join_failures(failures: &[RouteFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from the base-asset resolution capability
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetResolveError {
    #[error("Malformed asset URL {url}: {message}")]
    Malformed { url: String, message: String },

    #[error("Asset {url} not found at {path:?}")]
    Missing { url: String, path: PathBuf },
}

/// Errors from applying archive edits
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("Extension '{id}': edit path {path:?} does not exist in the archive")]
    MissingPath { id: String, path: String },

    #[error("Extension '{id}': edit path {path:?} is not a valid JSON pointer")]
    InvalidPath { id: String, path: String },

    #[error("Extension '{id}': cannot merge into {path:?}, target is not an object")]
    NotAnObject { id: String, path: String },
}

/// Errors from the catalog request/response exchange
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Catalog channel disconnected")]
    Disconnected,

    #[error("Malformed catalog message: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Catalog request failed ({code}): {message}")]
    Remote { code: i32, message: String },

    #[error("Response id {got} does not match request id {expected}")]
    MismatchedId { expected: u64, got: u64 },
}
