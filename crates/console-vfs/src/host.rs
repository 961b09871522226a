//! Read-only VFS over a directory of the host filesystem.

use std::fs;
use std::path::PathBuf;

use console_types::error::{ConsoleError, Result};

use crate::{EntryKind, Vfs, VfsEntry, VfsMetadata, resolve_path};

/// Exposes a host directory as the console root.
///
/// Every path is resolved on the host, symlinks included, and must land
/// inside the root.
#[derive(Debug, Clone)]
pub struct HostVfs {
    root: PathBuf,
}

impl HostVfs {
    /// Wrap `root`, which must be an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ConsoleError::Vfs(format!(
                "filesystem root is not a directory: {}",
                root.display()
            )));
        }
        let root = fs::canonicalize(&root)?;
        log::info!("Serving host directory {}", root.display());
        Ok(Self { root })
    }

    fn host_path(&self, path: &str) -> Result<PathBuf> {
        let resolved = resolve_path("/", path);
        let joined = self.root.join(resolved.trim_start_matches('/'));
        let host = fs::canonicalize(&joined)
            .map_err(|_| ConsoleError::Vfs(format!("no such path: {resolved}")))?;
        if !host.starts_with(&self.root) {
            log::warn!("Refusing {resolved}: resolves outside {}", self.root.display());
            return Err(ConsoleError::Vfs(format!("outside filesystem root: {resolved}")));
        }
        Ok(host)
    }
}

fn kind_of(meta: &fs::Metadata) -> EntryKind {
    if meta.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    }
}

impl Vfs for HostVfs {
    fn readdir(&self, path: &str) -> Result<Vec<VfsEntry>> {
        let mut entries = Vec::new();
        for dirent in fs::read_dir(self.host_path(path)?)? {
            let dirent = dirent?;
            let meta = dirent.metadata()?;
            let kind = kind_of(&meta);
            entries.push(VfsEntry {
                name: dirent.file_name().to_string_lossy().into_owned(),
                kind,
                size: if kind == EntryKind::File { meta.len() } else { 0 },
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let host = self.host_path(path)?;
        if host.is_dir() {
            return Err(ConsoleError::Vfs(format!("is a directory: {path}")));
        }
        Ok(fs::read(host)?)
    }

    fn stat(&self, path: &str) -> Result<VfsMetadata> {
        let meta = fs::metadata(self.host_path(path)?)
            .map_err(|_| ConsoleError::Vfs(format!("no such path: {path}")))?;
        let kind = kind_of(&meta);
        Ok(VfsMetadata {
            kind,
            size: if kind == EntryKind::File { meta.len() } else { 0 },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, HostVfs) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("etc")).unwrap();
        fs::create_dir_all(dir.path().join("usr/lib")).unwrap();
        fs::write(dir.path().join("etc/hosts"), b"localhost").unwrap();
        let vfs = HostVfs::new(dir.path()).unwrap();
        (dir, vfs)
    }

    #[test]
    fn new_rejects_missing_root() {
        assert!(HostVfs::new("/definitely/not/a/dir").is_err());
    }

    #[test]
    fn readdir_sorted() {
        let (_dir, vfs) = setup();
        let names: Vec<String> = vfs
            .readdir("/")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["etc", "usr"]);
    }

    #[test]
    fn read_and_stat_file() {
        let (_dir, vfs) = setup();
        assert_eq!(vfs.read("/etc/hosts").unwrap(), b"localhost");
        let meta = vfs.stat("etc/hosts").unwrap();
        assert_eq!(meta.kind, EntryKind::File);
        assert_eq!(meta.size, 9);
    }

    #[test]
    fn read_directory_fails() {
        let (_dir, vfs) = setup();
        assert!(vfs.read("/usr").is_err());
    }

    #[test]
    fn dotdot_stays_inside_root() {
        let (_dir, vfs) = setup();
        assert!(vfs.is_dir("/../../usr/lib"));
        let names: Vec<String> = vfs
            .readdir("/..")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["etc", "usr"]);
    }

    #[test]
    fn missing_path() {
        let (_dir, vfs) = setup();
        assert!(!vfs.exists("/var"));
        assert!(vfs.stat("/var").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_out_of_root_is_refused() {
        let (dir, vfs) = setup();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret"), b"host secret").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let err = vfs.read("/link/secret").unwrap_err();
        assert!(format!("{err}").contains("outside filesystem root"));
        assert!(vfs.readdir("/link").is_err());
        assert!(!vfs.exists("/link/secret"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_within_root_is_followed() {
        let (dir, vfs) = setup();
        std::os::unix::fs::symlink(dir.path().join("etc"), dir.path().join("conf")).unwrap();
        assert_eq!(vfs.read("/conf/hosts").unwrap(), b"localhost");
    }
}
