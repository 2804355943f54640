use super::Vfs;
use std::fs;
use std::io::Result;
use std::path::{Path, PathBuf};

/// OS File System implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct OsVfs;

impl Vfs for OsVfs {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
    }

    fn write_from_string(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            entries.push(entry.path());
        }
        entries.sort();
        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_list_dir_returns_direct_children() {
        let temp = tempdir().unwrap();
        let vfs = OsVfs;
        vfs.write_from_string(&temp.path().join("a/b.txt"), "b").unwrap();
        vfs.write_from_string(&temp.path().join("c.txt"), "c").unwrap();

        let entries = vfs.list_dir(temp.path()).unwrap();
        assert_eq!(entries, vec![temp.path().join("a"), temp.path().join("c.txt")]);
        assert!(vfs.is_dir(&temp.path().join("a")));
        assert!(vfs.is_file(&temp.path().join("c.txt")));
    }

    #[test]
    fn test_list_missing_dir_fails() {
        let temp = tempdir().unwrap();
        let err = OsVfs.list_dir(&temp.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
