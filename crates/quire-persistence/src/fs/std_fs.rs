//! Real disk access through `std::fs`.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use super::{DirEntry, FileSystem};

/// File system backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so a dangling link still counts as occupying the path
        fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push(DirEntry {
                name,
                path: entry.path(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        if fs::symlink_metadata(path)?.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rename_with_backup_keeps_original() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("doc.txt");
        let staged = dir.path().join(".doc.txt.tmp");
        let backup = dir.path().join("doc.txt~");

        fs::write(&target, b"old").unwrap();
        fs::write(&staged, b"new").unwrap();

        StdFileSystem
            .rename_with_backup(&staged, &target, &backup, true)
            .unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
        assert_eq!(fs::read(&backup).unwrap(), b"old");
        assert!(!staged.exists());
    }

    #[test]
    fn test_rename_with_backup_discards_original() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("doc.txt");
        let staged = dir.path().join(".doc.txt.tmp");
        let aside = dir.path().join(".doc.txt.old");

        fs::write(&target, b"old").unwrap();
        fs::write(&staged, b"new").unwrap();

        StdFileSystem
            .rename_with_backup(&staged, &target, &aside, false)
            .unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
        assert!(!aside.exists());
    }

    #[test]
    fn test_read_dir_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b"), b"").unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();

        let entries = StdFileSystem.read_dir(dir.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(entries[0].is_dir);
    }

    #[test]
    fn test_remove_directory_tree() {
        let dir = tempdir().unwrap();
        let bundle = dir.path().join("bundle");
        fs::create_dir_all(bundle.join("inner")).unwrap();
        fs::write(bundle.join("inner/file"), b"x").unwrap();

        StdFileSystem.remove(&bundle).unwrap();
        assert!(!StdFileSystem.exists(&bundle));
    }
}
