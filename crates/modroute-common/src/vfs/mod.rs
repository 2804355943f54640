use std::io::Result;
use std::path::{Path, PathBuf};

/// Virtual File System trait
///
/// Abstraction over the handful of file system operations the resolver needs:
/// - OS file system (asset directories on disk)
/// - In-memory file system (for testing)
///
/// # Contract
///
/// Implementations must maintain consistent behavior across all methods:
///
/// - **`exists(path)`**: Returns `true` if the path refers to either a file OR a directory.
///   This matches standard filesystem semantics (e.g., `std::path::Path::exists()`).
///
/// - **`is_dir(path)`** / **`is_file(path)`**: Mutually exclusive; both imply `exists()`.
///
/// - **`read_to_string(path)`**: Only succeeds for files. A missing path fails with
///   [`std::io::ErrorKind::NotFound`], which callers rely on to tell "absent" apart from
///   "present but unreadable".
///
/// - **`list_dir(path)`**: Returns the direct children of a directory. Fails if the path
///   does not exist or is not a directory.
pub trait Vfs: Send + Sync {
    /// Read a file to a string.
    ///
    /// Returns an error if the path does not exist or is a directory.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write a string to a file.
    ///
    /// Creates parent directories as needed. Overwrites existing files.
    fn write_from_string(&self, path: &Path, content: &str) -> Result<()>;

    /// Check if a path exists (file OR directory).
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if a path is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// List directory contents.
    ///
    /// Returns full paths of the direct children, files and directories alike.
    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Create a directory and all parent directories.
    ///
    /// Does nothing if the directory already exists.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
}

// Re-export implementations
pub use memory::MemoryVfs;
pub use os::OsVfs;

mod memory;
mod os;
