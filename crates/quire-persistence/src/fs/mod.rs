//! File-system collaborator.
//!
//! The atomic writer and representation reader are built on the narrow
//! [`FileSystem`] trait rather than on `std::fs` directly:
//! - `StdFileSystem` - The real disk
//! - `MemoryFileSystem` - An in-memory tree with fault injection for tests

mod memory;
mod std_fs;

use std::io;
use std::path::{Path, PathBuf};

pub use memory::{Fault, MemoryFileSystem};
pub use std_fs::StdFileSystem;

/// A direct child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Primitive file-system operations used by the persistence layer.
///
/// All methods take `&self`; implementations use interior mutability where
/// they need it.
pub trait FileSystem {
    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Create or truncate a file and write `bytes`, flushed to durable storage.
    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Direct children of a directory, sorted by name.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Rename a file or directory. `to` must not be an existing directory.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove a file or a whole directory tree.
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Move `from` onto `to`, first moving any existing `to` aside to `backup`.
    ///
    /// A file already at `backup` is set aside too and only dropped once it
    /// has been superseded by a new kept backup. If any step fails, `to` and
    /// `backup` are moved back so both are left exactly as they were. When
    /// `keep_backup` is false the moved-aside original is deleted once the
    /// new file is in place.
    fn rename_with_backup(
        &self,
        from: &Path,
        to: &Path,
        backup: &Path,
        keep_backup: bool,
    ) -> io::Result<()> {
        let previous = if self.exists(backup) {
            let previous = previous_backup_path(backup);
            if self.exists(&previous) {
                self.remove(&previous)?;
            }
            self.rename(backup, &previous)?;
            Some(previous)
        } else {
            None
        };

        let displaced = self.exists(to);
        let mut result = if displaced {
            self.rename(to, backup)
        } else {
            Ok(())
        };
        if result.is_ok() {
            result = self.rename(from, to);
            if result.is_err() && displaced {
                restore(self, backup, to);
            }
        }
        if let Err(err) = result {
            if let Some(previous) = &previous {
                restore(self, previous, backup);
            }
            return Err(err);
        }

        if displaced
            && !keep_backup
            && let Err(err) = self.remove(backup)
        {
            // The new file is already in place; a stale copy is not a failed save.
            tracing::warn!("Failed to remove {}: {}", backup.display(), err);
        }

        if let Some(previous) = previous {
            if displaced && keep_backup {
                if let Err(err) = self.remove(&previous) {
                    tracing::warn!("Failed to remove {}: {}", previous.display(), err);
                }
            } else {
                restore(self, &previous, backup);
            }
        }

        Ok(())
    }
}

/// Where an existing backup waits while a new one is being made.
fn previous_backup_path(backup: &Path) -> PathBuf {
    let mut name = backup.as_os_str().to_owned();
    name.push(".prev");
    PathBuf::from(name)
}

/// Move `from` back to `to`, logging instead of failing.
fn restore<F: FileSystem + ?Sized>(fs: &F, from: &Path, to: &Path) {
    if let Err(err) = fs.rename(from, to) {
        tracing::error!(
            "Failed to restore {} from {}: {}",
            to.display(),
            from.display(),
            err
        );
    }
}
