//! Atomicity guarantees of the writer, on disk and in memory.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use proptest::prelude::*;
use quire_model::{Package, Representation, RepresentationForm};
use quire_persistence::{
    AtomicWriter, BackupPolicy, Fault, FileSystem, MemoryFileSystem, PersistenceError,
    StdFileSystem, read_representation,
};
use tempfile::tempdir;

proptest! {
    #[test]
    fn test_failed_final_rename_keeps_original_bytes(
        original in proptest::collection::vec(any::<u8>(), 0..256),
        replacement in proptest::collection::vec(any::<u8>(), 0..256),
        keep_backup in any::<bool>(),
    ) {
        let fs = Rc::new(MemoryFileSystem::new());
        let target = Path::new("/work/doc.bin");
        fs.put(target, original.clone());
        fs.inject(Fault::RenameInto(target.to_path_buf()));

        let writer = AtomicWriter::new(fs.clone());
        let result = writer.write(
            &Representation::Bytes(replacement),
            target,
            BackupPolicy { keep_backup },
        );

        let is_atomic_failure = matches!(result, Err(PersistenceError::AtomicWriteFailed { .. }));
        prop_assert!(is_atomic_failure);
        prop_assert_eq!(fs.read_bytes(target).unwrap(), original);
        prop_assert_eq!(fs.paths(), vec![PathBuf::from("/work"), target.to_path_buf()]);
    }
}

#[test]
fn test_failed_save_keeps_previous_backup() {
    let fs = Rc::new(MemoryFileSystem::new());
    let target = Path::new("/work/doc.txt");
    let backup = Path::new("/work/doc.txt~");
    fs.put(target, "v2");
    fs.put(backup, "v1");
    fs.inject(Fault::RenameInto(target.to_path_buf()));

    let writer = AtomicWriter::new(fs.clone());
    let result = writer.write(&Representation::Bytes(b"v3".to_vec()), target, BackupPolicy::keep());

    assert!(matches!(result, Err(PersistenceError::AtomicWriteFailed { .. })));
    assert_eq!(fs.read_bytes(target).unwrap(), b"v2");
    assert_eq!(fs.read_bytes(backup).unwrap(), b"v1");
    assert_eq!(
        fs.paths(),
        vec![PathBuf::from("/work"), target.to_path_buf(), backup.to_path_buf()]
    );

    let report = writer
        .write(&Representation::Bytes(b"v3".to_vec()), target, BackupPolicy::keep())
        .unwrap();
    assert_eq!(report.backup_path.as_deref(), Some(backup));
    assert_eq!(fs.read_bytes(target).unwrap(), b"v3");
    assert_eq!(fs.read_bytes(backup).unwrap(), b"v2");
}

#[test]
fn test_package_round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("journal.notebook");

    let mut package = Package::new();
    package.insert_file("index.json", br#"{"title":"Journal"}"#.to_vec()).unwrap();
    package.insert_file("notes/001.txt", b"first".to_vec()).unwrap();
    package.insert_file("notes/002.txt", b"second".to_vec()).unwrap();
    let representation = Representation::Package(package);

    let writer = AtomicWriter::new(Rc::new(StdFileSystem));
    writer
        .write(&representation, &target, BackupPolicy::keep())
        .unwrap();

    let loaded = read_representation(&StdFileSystem, &target, RepresentationForm::Package).unwrap();
    assert_eq!(loaded, representation);
}

#[test]
fn test_package_backup_keeps_previous_bundle() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("journal.notebook");
    fs::create_dir_all(target.join("notes")).unwrap();
    fs::write(target.join("notes/001.txt"), b"old").unwrap();

    let mut package = Package::new();
    package.insert_file("notes/001.txt", b"new".to_vec()).unwrap();

    let writer = AtomicWriter::new(Rc::new(StdFileSystem));
    let report = writer
        .write(&Representation::Package(package), &target, BackupPolicy::keep())
        .unwrap();

    let backup = report.backup_path.unwrap();
    assert_eq!(fs::read(backup.join("notes/001.txt")).unwrap(), b"old");
    assert_eq!(fs::read(target.join("notes/001.txt")).unwrap(), b"new");
}
