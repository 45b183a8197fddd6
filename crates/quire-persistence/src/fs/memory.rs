//! In-memory file system for tests and previews.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use super::{DirEntry, FileSystem};

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

/// A failure to simulate on the next matching operation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Fault {
    /// Reading this path fails.
    Read(PathBuf),
    /// Writing a file at this path fails.
    Write(PathBuf),
    /// Renaming anything onto this path fails.
    RenameInto(PathBuf),
}

/// File system held entirely in memory.
///
/// Uses `RefCell` for interior mutability since documents live on a single
/// control thread. Each injected fault fires once.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    faults: RefCell<BTreeSet<Fault>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a simulated failure.
    pub fn inject(&self, fault: Fault) {
        self.faults.borrow_mut().insert(fault);
    }

    pub fn clear_faults(&self) {
        self.faults.borrow_mut().clear();
    }

    /// Test helper: write a file, creating its parent directories.
    pub fn put(&self, path: impl AsRef<Path>, bytes: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.insert_dirs(parent);
        }
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Node::File(bytes.into()));
    }

    /// Every path currently stored, in order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.nodes.borrow().keys().cloned().collect()
    }

    fn fault(&self, fault: &Fault) -> io::Result<()> {
        if self.faults.borrow_mut().remove(fault) {
            return Err(io::Error::other(format!("simulated failure: {fault:?}")));
        }
        Ok(())
    }

    fn insert_dirs(&self, path: &Path) {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.ancestors() {
            if is_root(ancestor) {
                continue;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    fn parent_is_dir(&self, path: &Path) -> bool {
        match path.parent() {
            None => true,
            Some(parent) if is_root(parent) => true,
            Some(parent) => matches!(self.nodes.borrow().get(parent), Some(Node::Dir)),
        }
    }
}

fn is_root(path: &Path) -> bool {
    path.as_os_str().is_empty() || path.parent().is_none()
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
    )
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        is_root(path) || self.nodes.borrow().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        is_root(path) || matches!(self.nodes.borrow().get(path), Some(Node::Dir))
    }

    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.fault(&Fault::Read(path.to_path_buf()))?;
        match self.nodes.borrow().get(path) {
            Some(Node::File(bytes)) => Ok(bytes.clone()),
            Some(Node::Dir) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.fault(&Fault::Write(path.to_path_buf()))?;
        if !self.parent_is_dir(path) {
            return Err(not_found(path.parent().unwrap_or(path)));
        }
        let mut nodes = self.nodes.borrow_mut();
        if matches!(nodes.get(path), Some(Node::Dir)) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            ));
        }
        nodes.insert(path.to_path_buf(), Node::File(bytes.to_vec()));
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let blocked = path
            .ancestors()
            .any(|a| matches!(self.nodes.borrow().get(a), Some(Node::File(_))));
        if blocked {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("a file blocks {}", path.display()),
            ));
        }
        self.insert_dirs(path);
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        self.fault(&Fault::Read(path.to_path_buf()))?;
        if !self.is_dir(path) {
            return Err(not_found(path));
        }
        let nodes = self.nodes.borrow();
        let entries = nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(path))
            .filter_map(|(child, node)| {
                let name = child.file_name()?.to_string_lossy().into_owned();
                Some(DirEntry {
                    name,
                    path: child.clone(),
                    is_dir: matches!(node, Node::Dir),
                })
            })
            .collect();
        Ok(entries)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.fault(&Fault::RenameInto(to.to_path_buf()))?;
        if !self.nodes.borrow().contains_key(from) {
            return Err(not_found(from));
        }
        if !self.parent_is_dir(to) {
            return Err(not_found(to.parent().unwrap_or(to)));
        }
        if self.is_dir(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is an existing directory", to.display()),
            ));
        }

        let mut nodes = self.nodes.borrow_mut();
        let moved: Vec<PathBuf> = nodes
            .keys()
            .filter(|key| key.starts_with(from))
            .cloned()
            .collect();
        for key in moved {
            if let Some(node) = nodes.remove(&key) {
                let relative = key.strip_prefix(from).unwrap_or(Path::new(""));
                let new_key = if relative.as_os_str().is_empty() {
                    to.to_path_buf()
                } else {
                    to.join(relative)
                };
                nodes.insert(new_key, node);
            }
        }
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        if !nodes.contains_key(path) {
            return Err(not_found(path));
        }
        nodes.retain(|key, _| !key.starts_with(path));
        Ok(())
    }
}
