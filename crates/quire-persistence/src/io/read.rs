//! Representation loading.

use std::path::Path;

use quire_model::{Package, Representation, RepresentationForm};

use crate::error::{PersistenceError, Result};
use crate::fs::FileSystem;

/// Read the representation stored at `path` in the given form.
///
/// A byte-form type must be a regular file and a package-form type must be
/// a directory; anything else is reported as corrupt data.
pub fn read_representation(
    fs: &dyn FileSystem,
    path: &Path,
    form: RepresentationForm,
) -> Result<Representation> {
    if !fs.exists(path) {
        return Err(PersistenceError::io(
            "read",
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
        ));
    }

    let representation = match form {
        RepresentationForm::Bytes => {
            if fs.is_dir(path) {
                return Err(
                    PersistenceError::corrupt("expected a file but found a directory").with_path(path),
                );
            }
            let bytes = fs
                .read_bytes(path)
                .map_err(|e| PersistenceError::io("read", path, e))?;
            Representation::Bytes(bytes)
        }
        RepresentationForm::Package => {
            if !fs.is_dir(path) {
                return Err(
                    PersistenceError::corrupt("expected a package directory but found a file")
                        .with_path(path),
                );
            }
            Representation::Package(read_package(fs, path)?)
        }
    };

    tracing::debug!(
        "Read {} from {} ({} bytes)",
        form.label(),
        path.display(),
        representation.size()
    );
    Ok(representation)
}

fn read_package(fs: &dyn FileSystem, dir: &Path) -> Result<Package> {
    let mut package = Package::new();
    let entries = fs
        .read_dir(dir)
        .map_err(|e| PersistenceError::io("read", dir, e))?;

    for entry in entries {
        if entry.is_dir {
            let child = read_package(fs, &entry.path)?;
            package
                .insert_directory(&entry.name, child)
                .map_err(|e| PersistenceError::corrupt(e).with_path(&entry.path))?;
        } else {
            let bytes = fs
                .read_bytes(&entry.path)
                .map_err(|e| PersistenceError::io("read", &entry.path, e))?;
            package
                .insert_file(&entry.name, bytes)
                .map_err(|e| PersistenceError::corrupt(e).with_path(&entry.path))?;
        }
    }
    Ok(package)
}
