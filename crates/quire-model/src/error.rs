//! Model error types.

use thiserror::Error;

/// Error raised while building packages or registering document types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A package path was empty, absolute, or escaped its root.
    #[error("Invalid package path: {path}")]
    InvalidPackagePath { path: String },

    /// A package path goes through an entry that is a file, not a directory.
    #[error("Package entry '{path}' is not a directory")]
    NotADirectory { path: String },

    /// Two document types in the same descriptor share a tag.
    #[error("Document type '{tag}' is declared twice by '{class}'")]
    DuplicateType { class: String, tag: String },

    /// A document class was registered twice.
    #[error("Document class '{class}' is already registered")]
    DuplicateClass { class: String },

    /// A descriptor declared no type at all.
    #[error("Document class '{class}' declares no document types")]
    EmptyDescriptor { class: String },
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
