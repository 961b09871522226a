//! In-memory VFS implementation.
//!
//! Backs the demo filesystem and unit tests. The whole tree lives in a
//! `BTreeMap` keyed by resolved absolute path, so children of a directory
//! are a contiguous, already-sorted key range.

use std::collections::BTreeMap;

use console_types::error::{ConsoleError, Result};

use crate::{EntryKind, Vfs, VfsEntry, VfsMetadata, resolve_path};

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

impl Node {
    fn metadata(&self) -> VfsMetadata {
        match self {
            Self::File(data) => VfsMetadata {
                kind: EntryKind::File,
                size: data.len() as u64,
            },
            Self::Dir => VfsMetadata {
                kind: EntryKind::Directory,
                size: 0,
            },
        }
    }
}

/// A fully in-memory filesystem. Populated through [`MemoryVfs::mkdir`] and
/// [`MemoryVfs::write`] before being handed to the console.
#[derive(Debug)]
pub struct MemoryVfs {
    nodes: BTreeMap<String, Node>,
}

impl MemoryVfs {
    /// Create a filesystem holding only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir);
        Self { nodes }
    }

    /// Create a directory and any missing parents. Existing directories are
    /// left alone.
    pub fn mkdir(&mut self, path: &str) -> Result<()> {
        let path = resolve_path("/", path);
        let mut partial = String::new();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            partial.push('/');
            partial.push_str(component);
            match self.nodes.get(&partial) {
                Some(Node::Dir) => {},
                Some(Node::File(_)) => {
                    return Err(ConsoleError::Vfs(format!("not a directory: {partial}")));
                },
                None => {
                    self.nodes.insert(partial.clone(), Node::Dir);
                },
            }
        }
        Ok(())
    }

    /// Create or replace a file. The parent directory must exist.
    pub fn write(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let path = resolve_path("/", path);
        if path == "/" {
            return Err(ConsoleError::Vfs("cannot write to root".to_string()));
        }
        let parent = match path.rfind('/') {
            Some(0) | None => "/",
            Some(i) => &path[..i],
        };
        match self.nodes.get(parent) {
            Some(Node::Dir) => {},
            _ => {
                return Err(ConsoleError::Vfs(format!(
                    "parent directory does not exist: {parent}"
                )));
            },
        }
        if matches!(self.nodes.get(&path), Some(Node::Dir)) {
            return Err(ConsoleError::Vfs(format!("is a directory: {path}")));
        }
        self.nodes.insert(path, Node::File(data.to_vec()));
        Ok(())
    }

    fn node(&self, path: &str) -> Option<(String, &Node)> {
        let path = resolve_path("/", path);
        let node = self.nodes.get(&path)?;
        Some((path, node))
    }
}

impl Default for MemoryVfs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vfs for MemoryVfs {
    fn readdir(&self, path: &str) -> Result<Vec<VfsEntry>> {
        let (path, node) = self
            .node(path)
            .ok_or_else(|| ConsoleError::Vfs(format!("no such directory: {path}")))?;
        if let Node::File(_) = node {
            return Err(ConsoleError::Vfs(format!("not a directory: {path}")));
        }

        let prefix = if path == "/" {
            path
        } else {
            format!("{path}/")
        };
        let entries = self
            .nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter_map(|(key, node)| {
                let name = &key[prefix.len()..];
                if name.is_empty() || name.contains('/') {
                    return None;
                }
                let meta = node.metadata();
                Some(VfsEntry {
                    name: name.to_string(),
                    kind: meta.kind,
                    size: meta.size,
                })
            })
            .collect();
        Ok(entries)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        match self.node(path) {
            Some((_, Node::File(data))) => Ok(data.clone()),
            Some((path, Node::Dir)) => Err(ConsoleError::Vfs(format!("is a directory: {path}"))),
            None => Err(ConsoleError::Vfs(format!("no such file: {path}"))),
        }
    }

    fn stat(&self, path: &str) -> Result<VfsMetadata> {
        self.node(path)
            .map(|(_, node)| node.metadata())
            .ok_or_else(|| ConsoleError::Vfs(format!("no such path: {path}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryVfs {
        let mut vfs = MemoryVfs::new();
        vfs.mkdir("/usr/lib").unwrap();
        vfs.mkdir("/etc").unwrap();
        vfs.write("/etc/hosts", b"127.0.0.1 localhost\n").unwrap();
        vfs.write("/etc/fstab", b"").unwrap();
        vfs
    }

    #[test]
    fn root_exists() {
        assert!(MemoryVfs::new().exists("/"));
    }

    #[test]
    fn readdir_sorted_direct_children() {
        let vfs = sample();
        let names: Vec<String> = vfs
            .readdir("/")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["etc", "usr"]);

        let etc = vfs.readdir("/etc").unwrap();
        assert_eq!(etc.len(), 2);
        assert_eq!(etc[0].name, "fstab");
        assert_eq!(etc[1].kind, EntryKind::File);
        assert_eq!(etc[1].size, 20);
    }

    #[test]
    fn readdir_excludes_grandchildren() {
        let vfs = sample();
        let names: Vec<String> = vfs
            .readdir("/usr")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["lib"]);
    }

    #[test]
    fn readdir_on_file_fails() {
        assert!(sample().readdir("/etc/hosts").is_err());
    }

    #[test]
    fn readdir_missing_fails() {
        assert!(sample().readdir("/var").is_err());
    }

    #[test]
    fn read_file() {
        assert_eq!(sample().read("/etc/hosts").unwrap(), b"127.0.0.1 localhost\n");
    }

    #[test]
    fn read_dir_fails() {
        let err = sample().read("/etc").unwrap_err();
        assert!(format!("{err}").contains("is a directory"));
    }

    #[test]
    fn paths_are_resolved() {
        let vfs = sample();
        assert!(vfs.exists("//etc/./hosts"));
        assert!(vfs.exists("/usr/lib/../../etc/"));
    }

    #[test]
    fn mkdir_is_idempotent() {
        let mut vfs = sample();
        vfs.mkdir("/usr/lib").unwrap();
        assert_eq!(vfs.readdir("/usr").unwrap().len(), 1);
    }

    #[test]
    fn mkdir_through_file_fails() {
        let mut vfs = sample();
        assert!(vfs.mkdir("/etc/hosts/sub").is_err());
    }

    #[test]
    fn write_without_parent_fails() {
        let mut vfs = MemoryVfs::new();
        assert!(vfs.write("/no/such/file", b"x").is_err());
    }

    #[test]
    fn write_over_directory_fails() {
        let mut vfs = sample();
        assert!(vfs.write("/usr", b"x").is_err());
        assert!(vfs.is_dir("/usr"));
    }

    #[test]
    fn overwrite_file() {
        let mut vfs = sample();
        vfs.write("/etc/hosts", b"new").unwrap();
        assert_eq!(vfs.read("/etc/hosts").unwrap(), b"new");
    }

    #[test]
    fn stat_reports_kind_and_size() {
        let vfs = sample();
        assert_eq!(vfs.stat("/etc").unwrap().kind, EntryKind::Directory);
        assert_eq!(vfs.stat("/etc/fstab").unwrap().size, 0);
        assert!(vfs.stat("/missing").is_err());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn write_then_read_roundtrips(
                dir in "[a-z]{1,8}",
                file in "[a-z]{1,8}",
                data in proptest::collection::vec(any::<u8>(), 0..256),
            ) {
                let mut vfs = MemoryVfs::new();
                vfs.mkdir(&format!("/{dir}")).unwrap();
                let path = format!("/{dir}/{file}");
                vfs.write(&path, &data).unwrap();
                prop_assert_eq!(vfs.read(&path).unwrap(), data);
            }

            #[test]
            fn mkdir_creates_every_parent(segments in proptest::collection::vec("[a-z]{1,6}", 1..5)) {
                let mut vfs = MemoryVfs::new();
                vfs.mkdir(&segments.join("/")).unwrap();
                let mut partial = String::new();
                for seg in &segments {
                    partial.push('/');
                    partial.push_str(seg);
                    prop_assert!(vfs.is_dir(&partial), "missing parent: {partial}");
                }
            }
        }
    }
}
