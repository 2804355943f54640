//! In-memory snapshots of directory trees
//!
//! A crawl mirrors the filesystem shape: directories become nested maps and
//! everything else becomes a [`FileTreeNode::File`] marker.

use modroute_common::vfs::Vfs;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Children of a directory, keyed by entry name
pub type FileTree = BTreeMap<String, FileTreeNode>;

/// A single entry in a crawled tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTreeNode {
    /// Something that is not a directory
    File,
    /// A directory; empty when the crawl was not recursive
    Dir(FileTree),
}

/// Enumerate `root` into a [`FileTree`]
///
/// Non-recursive crawls record subdirectories as empty placeholders without
/// looking inside them. Entries whose names are not valid UTF-8 cannot be
/// addressed by a URL and are left out.
pub fn crawl(vfs: &dyn Vfs, root: &Path, recursive: bool) -> std::io::Result<FileTree> {
    let mut tree = FileTree::new();
    for entry in vfs.list_dir(root)? {
        let Some(name) = entry.file_name() else {
            continue;
        };
        let Some(name) = name.to_str().map(str::to_string) else {
            warn!("Skipping {:?}: name is not valid UTF-8", entry);
            continue;
        };

        let node = if vfs.is_dir(&entry) {
            if recursive {
                FileTreeNode::Dir(crawl(vfs, &entry, true)?)
            } else {
                FileTreeNode::Dir(FileTree::new())
            }
        } else {
            FileTreeNode::File
        };
        tree.insert(name, node);
    }
    Ok(tree)
}

/// Relative `/`-joined paths of every file in `tree`, depth first
pub fn flatten(tree: &FileTree, prefix: &str) -> Vec<String> {
    let mut paths = Vec::new();
    for (name, node) in tree {
        let subpath = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", prefix, name)
        };
        match node {
            FileTreeNode::File => paths.push(subpath),
            FileTreeNode::Dir(children) => paths.extend(flatten(children, &subpath)),
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use modroute_common::vfs::MemoryVfs;
    use std::collections::BTreeSet;

    fn sample_vfs() -> MemoryVfs {
        MemoryVfs::new()
            .with_file("/mod/img/a/b.png", "")
            .with_file("/mod/img/c.png", "")
            .with_file("/mod/readme.txt", "")
    }

    #[test]
    fn test_recursive_crawl() {
        let vfs = sample_vfs();
        let tree = crawl(&vfs, Path::new("/mod/img"), true).unwrap();

        let mut a = FileTree::new();
        a.insert("b.png".to_string(), FileTreeNode::File);
        let mut expected = FileTree::new();
        expected.insert("a".to_string(), FileTreeNode::Dir(a));
        expected.insert("c.png".to_string(), FileTreeNode::File);
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_shallow_crawl_leaves_placeholders() {
        let vfs = sample_vfs();
        let tree = crawl(&vfs, Path::new("/mod"), false).unwrap();

        assert_eq!(tree.get("img"), Some(&FileTreeNode::Dir(FileTree::new())));
        assert_eq!(tree.get("readme.txt"), Some(&FileTreeNode::File));
        assert!(flatten(&tree, "").contains(&"readme.txt".to_string()));
    }

    #[test]
    fn test_crawl_missing_root() {
        let vfs = sample_vfs();
        let err = crawl(&vfs, Path::new("/nope"), true).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_flatten_with_prefix() {
        let mut a = FileTree::new();
        a.insert("b".to_string(), FileTreeNode::File);
        let mut tree = FileTree::new();
        tree.insert("a".to_string(), FileTreeNode::Dir(a));
        tree.insert("c".to_string(), FileTreeNode::File);

        let flat: BTreeSet<_> = flatten(&tree, "p").into_iter().collect();
        let expected: BTreeSet<_> = ["p/a/b", "p/c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(flat, expected);
    }
}
