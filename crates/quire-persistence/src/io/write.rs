//! Atomic representation writes.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use quire_model::{Package, PackageEntry, Representation};

use crate::error::{PersistenceError, Result};
use crate::fs::FileSystem;

/// Whether the replaced file is kept after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackupPolicy {
    pub keep_backup: bool,
}

impl BackupPolicy {
    /// Keep the previous file as a backup.
    pub fn keep() -> Self {
        Self { keep_backup: true }
    }

    /// Discard the previous file once the new one is in place.
    pub fn discard() -> Self {
        Self { keep_backup: false }
    }
}

/// Naming of the sibling files the writer creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Appended to the file name to form the backup name.
    pub backup_suffix: String,

    /// Appended to the hidden staging name (`.<name><suffix>`).
    pub temp_suffix: String,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            backup_suffix: "~".to_string(),
            temp_suffix: ".quire-tmp".to_string(),
        }
    }
}

/// Result of a completed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub target_path: PathBuf,

    /// Payload size in bytes.
    pub bytes_written: u64,

    /// Where the previous file was kept, if a backup was made.
    pub backup_path: Option<PathBuf>,
}

/// Writes representations so the target is never left partially overwritten.
///
/// The representation is staged at a hidden sibling of the target and only
/// renamed into place once fully written. An existing target is moved aside
/// first and moved back if the final rename fails.
pub struct AtomicWriter {
    fs: Rc<dyn FileSystem>,
    options: WriterOptions,
}

impl AtomicWriter {
    pub fn new(fs: Rc<dyn FileSystem>) -> Self {
        Self::with_options(fs, WriterOptions::default())
    }

    pub fn with_options(fs: Rc<dyn FileSystem>, options: WriterOptions) -> Self {
        Self { fs, options }
    }

    /// Path of the backup kept for `target`.
    pub fn backup_path(&self, target: &Path) -> PathBuf {
        sibling(target, "", &self.options.backup_suffix)
    }

    fn temp_path(&self, target: &Path) -> PathBuf {
        sibling(target, ".", &self.options.temp_suffix)
    }

    fn displaced_path(&self, target: &Path) -> PathBuf {
        sibling(target, ".", &format!("{}-old", self.options.temp_suffix))
    }

    /// Write `representation` to `target`.
    pub fn write(
        &self,
        representation: &Representation,
        target: &Path,
        policy: BackupPolicy,
    ) -> Result<WriteReport> {
        if target.file_name().is_none() {
            return Err(PersistenceError::io(
                "write",
                target,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            ));
        }

        // Create parent directory if needed
        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            self.fs
                .create_dir_all(parent)
                .map_err(|e| PersistenceError::io("create directory", parent, e))?;
        }

        let temp_path = self.temp_path(target);
        if self.fs.exists(&temp_path) {
            self.fs
                .remove(&temp_path)
                .map_err(|e| PersistenceError::io("remove", &temp_path, e))?;
        }

        // Stage the new contents; the target is untouched until this succeeds.
        if let Err(err) = self.write_staged(representation, &temp_path) {
            self.discard_staged(&temp_path);
            return Err(err);
        }

        let replacing = self.fs.exists(target);
        let aside = if policy.keep_backup {
            self.backup_path(target)
        } else {
            self.displaced_path(target)
        };
        if !policy.keep_backup && self.fs.exists(&aside) {
            // Left behind by an interrupted write.
            self.fs
                .remove(&aside)
                .map_err(|e| PersistenceError::io("remove", &aside, e))?;
        }

        self.fs
            .rename_with_backup(&temp_path, target, &aside, policy.keep_backup)
            .map_err(|e| {
                self.discard_staged(&temp_path);
                PersistenceError::AtomicWriteFailed {
                    temp_path: temp_path.clone(),
                    target_path: target.to_path_buf(),
                    source: e,
                }
            })?;

        tracing::debug!(
            "Wrote {} ({} bytes, replaced existing: {})",
            target.display(),
            representation.size(),
            replacing
        );

        Ok(WriteReport {
            target_path: target.to_path_buf(),
            bytes_written: representation.size(),
            backup_path: (replacing && policy.keep_backup).then_some(aside),
        })
    }

    fn write_staged(&self, representation: &Representation, path: &Path) -> Result<()> {
        match representation {
            Representation::Bytes(bytes) => self
                .fs
                .write_bytes(path, bytes)
                .map_err(|e| PersistenceError::io("write", path, e)),
            Representation::Package(package) => self.write_package(package, path),
        }
    }

    fn write_package(&self, package: &Package, dir: &Path) -> Result<()> {
        self.fs
            .create_dir_all(dir)
            .map_err(|e| PersistenceError::io("create directory", dir, e))?;

        for (name, entry) in package.entries() {
            let path = dir.join(name);
            match entry {
                PackageEntry::File(bytes) => self
                    .fs
                    .write_bytes(&path, bytes)
                    .map_err(|e| PersistenceError::io("write", &path, e))?,
                PackageEntry::Directory(child) => self.write_package(child, &path)?,
            }
        }
        Ok(())
    }

    fn discard_staged(&self, temp_path: &Path) {
        if self.fs.exists(temp_path)
            && let Err(err) = self.fs.remove(temp_path)
        {
            tracing::warn!("Failed to remove {}: {}", temp_path.display(), err);
        }
    }
}

/// `<dir>/<prefix><file name><suffix>`
fn sibling(target: &Path, prefix: &str, suffix: &str) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!("{prefix}{name}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{Fault, MemoryFileSystem, StdFileSystem};
    use std::fs;
    use tempfile::tempdir;

    fn memory_writer() -> (Rc<MemoryFileSystem>, AtomicWriter) {
        let fs = Rc::new(MemoryFileSystem::new());
        let writer = AtomicWriter::new(fs.clone());
        (fs, writer)
    }

    #[test]
    fn test_write_new_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.txt");
        let writer = AtomicWriter::new(Rc::new(StdFileSystem));

        let report = writer
            .write(
                &Representation::Bytes(b"hello".to_vec()),
                &path,
                BackupPolicy::keep(),
            )
            .unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"hello");
        assert_eq!(report.bytes_written, 5);
        assert_eq!(report.backup_path, None);
        assert!(!dir.path().join("nested").join(".doc.txt.quire-tmp").exists());
    }

    #[test]
    fn test_keep_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, b"v1").unwrap();
        let writer = AtomicWriter::new(Rc::new(StdFileSystem));

        let report = writer
            .write(&Representation::Bytes(b"v2".to_vec()), &path, BackupPolicy::keep())
            .unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"v2");
        let backup = report.backup_path.unwrap();
        assert_eq!(backup, dir.path().join("doc.txt~"));
        assert_eq!(fs::read(backup).unwrap(), b"v1");
    }

    #[test]
    fn test_discard_backup() {
        let (fs, writer) = memory_writer();
        fs.put("/docs/doc.txt", b"v1".to_vec());

        writer
            .write(
                &Representation::Bytes(b"v2".to_vec()),
                Path::new("/docs/doc.txt"),
                BackupPolicy::discard(),
            )
            .unwrap();

        assert_eq!(fs.paths(), vec![PathBuf::from("/docs"), PathBuf::from("/docs/doc.txt")]);
    }

    #[test]
    fn test_failed_staging_leaves_target_untouched() {
        let (fs, writer) = memory_writer();
        fs.put("/docs/doc.txt", b"original".to_vec());
        fs.inject(Fault::Write(PathBuf::from("/docs/.doc.txt.quire-tmp")));

        let err = writer
            .write(
                &Representation::Bytes(b"new".to_vec()),
                Path::new("/docs/doc.txt"),
                BackupPolicy::discard(),
            )
            .unwrap_err();

        assert!(matches!(err, PersistenceError::Io { operation: "write", .. }));
        assert_eq!(
            fs.read_bytes(Path::new("/docs/doc.txt")).unwrap(),
            b"original"
        );
        assert!(!fs.exists(Path::new("/docs/.doc.txt.quire-tmp")));
    }

    #[test]
    fn test_failed_final_rename_restores_original() {
        let (fs, writer) = memory_writer();
        fs.put("/docs/doc.txt", b"original".to_vec());
        fs.inject(Fault::RenameInto(PathBuf::from("/docs/doc.txt")));

        let err = writer
            .write(
                &Representation::Bytes(b"new".to_vec()),
                Path::new("/docs/doc.txt"),
                BackupPolicy::keep(),
            )
            .unwrap_err();

        assert!(matches!(err, PersistenceError::AtomicWriteFailed { .. }));
        assert_eq!(
            fs.read_bytes(Path::new("/docs/doc.txt")).unwrap(),
            b"original"
        );
        assert!(!fs.exists(Path::new("/docs/doc.txt~")));
        assert!(!fs.exists(Path::new("/docs/.doc.txt.quire-tmp")));
    }

    #[test]
    fn test_write_package_replaces_directory() {
        let (fs, writer) = memory_writer();
        fs.put("/docs/book.notebook/old.txt", b"stale".to_vec());

        let mut package = Package::new();
        package.insert_file("index.json", b"[]".to_vec()).unwrap();
        package.insert_file("notes/1.txt", b"one".to_vec()).unwrap();

        writer
            .write(
                &Representation::Package(package),
                Path::new("/docs/book.notebook"),
                BackupPolicy::discard(),
            )
            .unwrap();

        assert!(!fs.exists(Path::new("/docs/book.notebook/old.txt")));
        assert_eq!(
            fs.read_bytes(Path::new("/docs/book.notebook/notes/1.txt")).unwrap(),
            b"one"
        );
    }
}
