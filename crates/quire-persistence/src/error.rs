//! Persistence error types.
//!
//! All persistence operations return structured errors that provide
//! user-friendly messages and optional remediation hints.

use std::path::{Path, PathBuf};

use quire_model::RepresentationForm;
use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The requested type tag or representation form is not supported.
    #[error("Document type '{type_tag}' cannot be {operation} as a {}", .form.label())]
    UnsupportedType {
        type_tag: String,
        form: RepresentationForm,
        operation: &'static str,
    },

    /// Decoding failed because the stored data is malformed.
    #[error("Document data is corrupt: {reason}")]
    CorruptData {
        path: Option<PathBuf>,
        reason: String,
    },

    /// File I/O error.
    #[error("Failed to {operation} file: {}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed into place).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    /// Create an unsupported-type error.
    pub fn unsupported(
        type_tag: impl Into<String>,
        form: RepresentationForm,
        operation: &'static str,
    ) -> Self {
        Self::UnsupportedType {
            type_tag: type_tag.into(),
            form,
            operation,
        }
    }

    /// Create a corrupt-data error; the path is attached by the caller that knows it.
    pub fn corrupt(reason: impl std::fmt::Display) -> Self {
        Self::CorruptData {
            path: None,
            reason: reason.to_string(),
        }
    }

    /// Create an I/O error with the operation and path that failed.
    pub fn io(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Attach the offending path to a corrupt-data error that has none.
    #[must_use]
    pub fn with_path(self, path: &Path) -> Self {
        match self {
            Self::CorruptData { path: None, reason } => Self::CorruptData {
                path: Some(path.to_path_buf()),
                reason,
            },
            other => other,
        }
    }

    /// The path this error is about, if known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::UnsupportedType { .. } => None,
            Self::CorruptData { path, .. } => path.as_deref(),
            Self::Io { path, .. } => Some(path),
            Self::AtomicWriteFailed { target_path, .. } => Some(target_path),
        }
    }

    /// Whether this is a missing-file error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedType {
                type_tag,
                operation,
                ..
            } => {
                format!("Documents of type '{type_tag}' cannot be {operation} by this application.")
            }
            Self::CorruptData { path, reason } => match path {
                Some(path) => format!(
                    "The file at {} could not be read: {}",
                    path.display(),
                    reason
                ),
                None => format!("The document data could not be read: {reason}"),
            },
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::UnsupportedType { .. } => {
                Some("Choose a different file format.".into())
            }
            Self::CorruptData { .. } => Some("Try opening a backup if you have one.".into()),
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
