//! Filesystem-browsing service used by console commands.
//!
//! The console core never touches a filesystem. Commands such as `ls`, `cd`
//! and `cat` reach one through the read-only [`Vfs`] trait, which is shared
//! across background tasks and therefore `Send + Sync`.

mod host;
mod memory;

pub use host::HostVfs;
pub use memory::MemoryVfs;

use console_types::error::{ConsoleError, Result};

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry returned by [`Vfs::readdir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
}

/// Metadata returned by [`Vfs::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VfsMetadata {
    pub kind: EntryKind,
    pub size: u64,
}

/// Read-only view of a hierarchical filesystem with `/`-separated paths.
pub trait Vfs: Send + Sync {
    /// List the direct children of a directory, sorted by name.
    fn readdir(&self, path: &str) -> Result<Vec<VfsEntry>>;

    /// Read a whole file.
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Query a path.
    fn stat(&self, path: &str) -> Result<VfsMetadata>;

    /// Whether the path exists.
    fn exists(&self, path: &str) -> bool {
        self.stat(path).is_ok()
    }

    /// Whether the path exists and is a directory.
    fn is_dir(&self, path: &str) -> bool {
        self.stat(path)
            .is_ok_and(|meta| meta.kind == EntryKind::Directory)
    }

    /// Resolve `input` against `cwd` and require the result to exist.
    fn canonicalize(&self, cwd: &str, input: &str) -> Result<String> {
        let path = resolve_path(cwd, input);
        if self.exists(&path) {
            Ok(path)
        } else {
            Err(ConsoleError::Vfs(format!("no such path: {path}")))
        }
    }
}

/// Resolve a possibly-relative path against the current working directory.
///
/// The result is absolute, has no `.`/`..` components, no repeated slashes,
/// and no trailing slash (except for the root itself). `..` at the root
/// stays at the root.
pub fn resolve_path(cwd: &str, input: &str) -> String {
    let raw = if input.starts_with('/') {
        input.to_string()
    } else {
        format!("{cwd}/{input}")
    };

    let mut parts: Vec<&str> = Vec::new();
    for component in raw.split('/') {
        match component {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Split a path as typed by the user into its directory part (including the
/// trailing `/`, possibly empty) and the final partial component.
///
/// `"usr/li"` becomes `("usr/", "li")`, `"/e"` becomes `("/", "e")`, and
/// `"bin"` becomes `("", "bin")`.
pub fn split_partial(input: &str) -> (&str, &str) {
    match input.rfind('/') {
        Some(i) => input.split_at(i + 1),
        None => ("", input),
    }
}
