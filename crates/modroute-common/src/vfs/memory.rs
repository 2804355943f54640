use super::Vfs;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Result;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
}

/// In-Memory File System implementation (for testing)
///
/// Directories exist implicitly whenever a file lives below them, or explicitly
/// after `create_dir_all`.
#[derive(Clone, Default, Debug)]
pub struct MemoryVfs {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style file insertion for test fixtures.
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        {
            let mut state = self.lock();
            state
                .files
                .insert(Self::normalize_path(path.as_ref()), content.to_string());
        }
        self
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn normalize_path(path: &Path) -> PathBuf {
        let mut normalized = PathBuf::new();
        for component in path.components() {
            if let Component::CurDir = component {
                continue;
            }
            normalized.push(component);
        }
        if normalized.as_os_str().is_empty() {
            return PathBuf::from(".");
        }
        normalized
    }

    fn not_found(path: &Path) -> std::io::Error {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("No such file or directory: {:?}", path),
        )
    }

    fn dir_exists(state: &MemoryState, path: &Path) -> bool {
        if state.dirs.contains(path) {
            return true;
        }
        state
            .files
            .keys()
            .chain(state.dirs.iter())
            .any(|k| k.starts_with(path) && k != path)
    }
}

impl Vfs for MemoryVfs {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = MemoryVfs::normalize_path(path);
        let state = self.lock();
        state
            .files
            .get(&path)
            .cloned()
            .ok_or_else(|| MemoryVfs::not_found(&path))
    }

    fn write_from_string(&self, path: &Path, content: &str) -> Result<()> {
        let path = MemoryVfs::normalize_path(path);
        let mut state = self.lock();
        state.files.insert(path, content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = MemoryVfs::normalize_path(path);
        let state = self.lock();
        !state.files.contains_key(&path) && MemoryVfs::dir_exists(&state, &path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let path = MemoryVfs::normalize_path(path);
        self.lock().files.contains_key(&path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let path = MemoryVfs::normalize_path(path);
        let state = self.lock();
        if state.files.contains_key(&path) || !MemoryVfs::dir_exists(&state, &path) {
            return Err(MemoryVfs::not_found(&path));
        }

        // Keep only the first component below `path` so nested files surface as their
        // top-level directory.
        let mut children = BTreeSet::new();
        for key in state.files.keys().chain(state.dirs.iter()) {
            if let Ok(rest) = key.strip_prefix(&path) {
                if let Some(first) = rest.components().next() {
                    children.insert(path.join(first));
                }
            }
        }
        Ok(children.into_iter().collect())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let path = MemoryVfs::normalize_path(path);
        self.lock().dirs.insert(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_directories() {
        let vfs = MemoryVfs::new()
            .with_file("/assets/mods/a/mod.toml", "title = 'a'")
            .with_file("/assets/mods/b.toml", "title = 'b'");

        assert!(vfs.is_dir(Path::new("/assets/mods")));
        assert!(vfs.is_dir(Path::new("/assets/mods/a")));
        assert!(!vfs.is_file(Path::new("/assets/mods/a")));
        assert!(vfs.is_file(Path::new("/assets/mods/b.toml")));
        assert!(!vfs.exists(Path::new("/assets/other")));
    }

    #[test]
    fn test_list_dir_direct_children_only() {
        let vfs = MemoryVfs::new()
            .with_file("/root/x/y/z.png", "")
            .with_file("/root/x/w.png", "")
            .with_file("/root/v.png", "");

        let entries = vfs.list_dir(Path::new("/root")).unwrap();
        assert_eq!(
            entries,
            vec![PathBuf::from("/root/v.png"), PathBuf::from("/root/x")]
        );
    }

    #[test]
    fn test_list_dir_errors() {
        let vfs = MemoryVfs::new().with_file("/root/file.txt", "");
        assert_eq!(
            vfs.list_dir(Path::new("/nowhere")).unwrap_err().kind(),
            std::io::ErrorKind::NotFound
        );
        assert!(vfs.list_dir(Path::new("/root/file.txt")).is_err());
    }

    #[test]
    fn test_empty_directory() {
        let vfs = MemoryVfs::new();
        vfs.create_dir_all(Path::new("/root/empty")).unwrap();
        assert!(vfs.is_dir(Path::new("/root/empty")));
        assert!(vfs.list_dir(Path::new("/root/empty")).unwrap().is_empty());
        assert_eq!(
            vfs.list_dir(Path::new("/root")).unwrap(),
            vec![PathBuf::from("/root/empty")]
        );
    }
}
