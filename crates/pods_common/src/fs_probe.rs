//! Filesystem probe abstraction
//!
//! Resolution and discovery only ever ask four questions of the filesystem:
//! does a path exist, is it a directory, is it a socket, and what does a
//! directory contain. Production code uses `RealFs`. Tests use `FakeFs`, an
//! in-memory tree that needs no temporary directories.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Read-only filesystem capability used by every lookup
pub trait FsProbe: Send + Sync {
    /// Path exists (following symlinks)
    fn exists(&self, path: &Path) -> bool;

    /// Path exists and is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Path exists and is a Unix domain socket
    fn is_socket(&self, path: &Path) -> bool;

    /// Names of the immediate entries of a directory
    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>>;
}

// ============================================================================
// Real filesystem
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FsProbe for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_socket(&self, path: &Path) -> bool {
        fs::metadata(path)
            .map(|m| m.file_type().is_socket())
            .unwrap_or(false)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            // Non UTF-8 names can never match a service or compose file name
            if let Ok(name) = entry?.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }
}

// ============================================================================
// Fake filesystem (testing)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FakeNode {
    File,
    Dir,
    Socket,
}

/// In-memory filesystem tree
///
/// Parent directories are created implicitly.
///
/// ```rust,ignore
/// let fs = FakeFs::new()
///     .with_file("/pkg/compose/sim/docker-compose.yml")
///     .with_socket("/run/user/1000/wayland-0");
/// assert!(fs.is_dir(Path::new("/pkg/compose/sim")));
/// ```
#[derive(Debug, Default)]
pub struct FakeFs {
    nodes: BTreeMap<PathBuf, FakeNode>,
    unreadable: BTreeSet<PathBuf>,
    probes: AtomicUsize,
}

impl FakeFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.insert(path.as_ref(), FakeNode::File);
        self
    }

    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.insert(path.as_ref(), FakeNode::Dir);
        self
    }

    pub fn with_socket(mut self, path: impl AsRef<Path>) -> Self {
        self.insert(path.as_ref(), FakeNode::Socket);
        self
    }

    /// Directory exists but listing it fails with permission denied
    pub fn with_unreadable(mut self, path: impl AsRef<Path>) -> Self {
        self.insert(path.as_ref(), FakeNode::Dir);
        self.unreadable.insert(path.as_ref().to_path_buf());
        self
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), FakeNode::File);
    }

    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), FakeNode::Dir);
    }

    /// Number of probe calls answered so far
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }

    fn insert(&mut self, path: &Path, node: FakeNode) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.nodes.insert(ancestor.to_path_buf(), FakeNode::Dir);
        }
        self.nodes.insert(path.to_path_buf(), node);
    }

    fn node(&self, path: &Path) -> Option<FakeNode> {
        self.probes.fetch_add(1, Ordering::Relaxed);
        self.nodes.get(path).copied()
    }
}

impl FsProbe for FakeFs {
    fn exists(&self, path: &Path) -> bool {
        self.node(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.node(path) == Some(FakeNode::Dir)
    }

    fn is_socket(&self, path: &Path) -> bool {
        self.node(path) == Some(FakeNode::Socket)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        match self.node(path) {
            None => return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory")),
            Some(FakeNode::Dir) => {}
            Some(_) => return Err(io::Error::new(io::ErrorKind::Other, "not a directory")),
        }
        if self.unreadable.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        Ok(self
            .nodes
            .keys()
            .filter(|p| p.parent() == Some(path))
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect())
    }
}
