//! Persistable forms of document state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Which of the two representation forms a document type uses on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepresentationForm {
    /// A single flat file.
    #[default]
    Bytes,
    /// A directory bundle of files and nested directories.
    Package,
}

impl RepresentationForm {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bytes => "byte blob",
            Self::Package => "package",
        }
    }
}

/// Codec-produced form of a document, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Representation {
    Bytes(Vec<u8>),
    Package(Package),
}

impl Representation {
    pub fn form(&self) -> RepresentationForm {
        match self {
            Self::Bytes(_) => RepresentationForm::Bytes,
            Self::Package(_) => RepresentationForm::Package,
        }
    }

    /// Total payload size in bytes, summed over every file of a package.
    pub fn size(&self) -> u64 {
        match self {
            Self::Bytes(bytes) => bytes.len() as u64,
            Self::Package(package) => package.total_size(),
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Package(_) => None,
        }
    }

    pub fn as_package(&self) -> Option<&Package> {
        match self {
            Self::Package(package) => Some(package),
            Self::Bytes(_) => None,
        }
    }
}

/// A node inside a [`Package`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageEntry {
    File(Vec<u8>),
    Directory(Package),
}

/// Ordered tree of named entries modelling a directory-bundle document.
///
/// Entry names are single path components; nested paths such as
/// `"notes/001.txt"` are resolved through intermediate directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    entries: BTreeMap<String, PackageEntry>,
}

impl Package {
    /// Create an empty package.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate direct children in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &PackageEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Insert a file at a relative path, creating intermediate directories.
    ///
    /// Replaces any existing entry at that path.
    pub fn insert_file(&mut self, path: &str, contents: impl Into<Vec<u8>>) -> Result<()> {
        let (parents, name) = split_path(path)?;
        let dir = self.directory_mut_creating(&parents, path)?;
        dir.entries
            .insert(name.to_string(), PackageEntry::File(contents.into()));
        Ok(())
    }

    /// Insert a nested package at a relative path.
    pub fn insert_directory(&mut self, path: &str, package: Package) -> Result<()> {
        let (parents, name) = split_path(path)?;
        let dir = self.directory_mut_creating(&parents, path)?;
        dir.entries
            .insert(name.to_string(), PackageEntry::Directory(package));
        Ok(())
    }

    /// Look up any entry by relative path.
    pub fn get(&self, path: &str) -> Option<&PackageEntry> {
        let (parents, name) = split_path(path).ok()?;
        let mut dir = self;
        for component in parents {
            match dir.entries.get(component)? {
                PackageEntry::Directory(child) => dir = child,
                PackageEntry::File(_) => return None,
            }
        }
        dir.entries.get(name)
    }

    /// Contents of the file at `path`, if it exists and is a file.
    pub fn file(&self, path: &str) -> Option<&[u8]> {
        match self.get(path)? {
            PackageEntry::File(bytes) => Some(bytes),
            PackageEntry::Directory(_) => None,
        }
    }

    /// The nested package at `path`, if it exists and is a directory.
    pub fn directory(&self, path: &str) -> Option<&Package> {
        match self.get(path)? {
            PackageEntry::Directory(package) => Some(package),
            PackageEntry::File(_) => None,
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<PackageEntry> {
        self.entries.remove(name)
    }

    /// Every file in the tree as `(relative path, contents)`, depth first.
    pub fn files(&self) -> Vec<(String, &[u8])> {
        let mut out = Vec::new();
        self.collect_files("", &mut out);
        out
    }

    /// Sum of all file sizes in the tree.
    pub fn total_size(&self) -> u64 {
        self.entries
            .values()
            .map(|entry| match entry {
                PackageEntry::File(bytes) => bytes.len() as u64,
                PackageEntry::Directory(child) => child.total_size(),
            })
            .sum()
    }

    fn collect_files<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a [u8])>) {
        for (name, entry) in &self.entries {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            match entry {
                PackageEntry::File(bytes) => out.push((path, bytes)),
                PackageEntry::Directory(child) => child.collect_files(&path, out),
            }
        }
    }

    fn directory_mut_creating(&mut self, parents: &[&str], full_path: &str) -> Result<&mut Package> {
        let mut dir = self;
        for component in parents {
            let entry = dir
                .entries
                .entry((*component).to_string())
                .or_insert_with(|| PackageEntry::Directory(Package::new()));
            dir = match entry {
                PackageEntry::Directory(child) => child,
                PackageEntry::File(_) => {
                    return Err(ModelError::NotADirectory {
                        path: full_path.to_string(),
                    });
                }
            };
        }
        Ok(dir)
    }
}

/// Split a relative package path into parent components and the final name.
fn split_path(path: &str) -> Result<(Vec<&str>, &str)> {
    let invalid = || ModelError::InvalidPackagePath {
        path: path.to_string(),
    };

    if path.is_empty() || path.starts_with('/') {
        return Err(invalid());
    }

    let mut components: Vec<&str> = path.split('/').collect();
    if components
        .iter()
        .any(|c| c.is_empty() || *c == "." || *c == ".." || c.contains('\\'))
    {
        return Err(invalid());
    }

    let name = components.pop().ok_or_else(invalid)?;
    Ok((components, name))
}
