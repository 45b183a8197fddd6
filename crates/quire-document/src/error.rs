//! Document error and outcome types.

use std::path::{Path, PathBuf};

use quire_model::SaveKind;
use quire_persistence::PersistenceError;
use thiserror::Error;

use crate::controller::ControllerId;
use crate::document::DocumentId;

/// Document lifecycle error.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Encoding, decoding or file I/O failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Another lifecycle operation is waiting for a user response.
    #[error("A {pending} is already in progress")]
    OperationInFlight { pending: &'static str },

    /// The document has already been closed.
    #[error("The document is closed")]
    DocumentClosed,

    /// The operation needs a file on disk and the document has none.
    #[error("The document has no file")]
    NoBackingFile,

    /// No descriptor is registered for the model's class.
    #[error("Unknown document class '{class}'")]
    UnknownDocumentClass { class: String },

    /// The class is registered with an empty type list.
    #[error("Document class '{class}' declares no document types")]
    NoDocumentTypes { class: String },

    /// No document type matches a file's extension.
    #[error("No document type opens '{}'", .path.display())]
    UnknownExtension { path: PathBuf },

    #[error("No window controller {id}")]
    UnknownController { id: ControllerId },

    #[error("Window controller is already attached to document {document}")]
    ControllerAlreadyAttached { document: DocumentId },

    /// A window controller refused to close.
    #[error("Window controller {controller} refused to close")]
    CloseVetoed { controller: ControllerId },

    /// A `resume_*` call did not match the pending request.
    #[error("No {expected} is waiting for a response")]
    UnexpectedResponse { expected: &'static str },

    /// The edit does not fit the model, e.g. it names a missing item.
    #[error("'{label}' cannot be applied to the document")]
    EditNotApplicable { label: String },

    /// The chosen type is not offered for this kind of save.
    #[error("Type '{type_tag}' cannot be used for {}", .kind.label())]
    TypeNotAllowed { type_tag: String, kind: SaveKind },
}

impl DocumentError {
    /// The file this error is about, if known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Persistence(err) => err.path(),
            Self::UnknownExtension { path } => Some(path),
            _ => None,
        }
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Persistence(err) => err.user_message(),
            Self::OperationInFlight { pending } => {
                format!("Finish the current {pending} before starting another action.")
            }
            Self::DocumentClosed => "This document has already been closed.".to_string(),
            Self::NoBackingFile => "This document has never been saved.".to_string(),
            Self::UnknownExtension { path } => {
                format!("{} is not a document this application can open.", path.display())
            }
            Self::CloseVetoed { .. } => {
                "The document could not be closed because one of its windows is busy.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Persistence(err) => err.suggestion(),
            Self::NoBackingFile => Some("Save the document first.".into()),
            Self::CloseVetoed { .. } => Some("Finish the open task in that window and try again.".into()),
            Self::TypeNotAllowed { .. } => Some("Choose a different file format.".into()),
            _ => None,
        }
    }
}

/// Result type alias for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// How an asynchronous lifecycle operation ended.
#[derive(Debug)]
pub enum Outcome<T> {
    Completed(T),
    /// The user declined; not an error.
    Cancelled,
    Failed(DocumentError),
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn error(&self) -> Option<&DocumentError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Convert to a `Result`, with cancellation as `None`.
    pub fn into_result(self) -> Result<Option<T>> {
        match self {
            Self::Completed(value) => Ok(Some(value)),
            Self::Cancelled => Ok(None),
            Self::Failed(err) => Err(err),
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(err) => Self::Failed(err),
        }
    }
}

/// A completed save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDocument {
    pub kind: SaveKind,
    pub path: PathBuf,
    pub type_tag: String,

    /// Where the replaced file was kept, if a backup was made.
    pub backup_path: Option<PathBuf>,
}

/// Outcome delivered to save continuations.
pub type SaveOutcome = Outcome<SavedDocument>;

impl SaveOutcome {
    pub fn did_save(&self) -> bool {
        self.is_completed()
    }

    pub fn target_path(&self) -> Option<&Path> {
        match self {
            Self::Completed(saved) => Some(&saved.path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_error_is_transparent() {
        let err: DocumentError = PersistenceError::corrupt("truncated").into();
        assert_eq!(err.to_string(), "Document data is corrupt: truncated");
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_outcome_into_result() {
        assert_eq!(Outcome::Completed(3).into_result().unwrap(), Some(3));
        assert_eq!(Outcome::<u8>::Cancelled.into_result().unwrap(), None);
        assert!(
            Outcome::<u8>::Failed(DocumentError::DocumentClosed)
                .into_result()
                .is_err()
        );
    }

    #[test]
    fn test_save_outcome_target_path() {
        let outcome = SaveOutcome::Completed(SavedDocument {
            kind: SaveKind::SaveAs,
            path: PathBuf::from("/tmp/a.doc"),
            type_tag: "quire.text".into(),
            backup_path: None,
        });
        assert!(outcome.did_save());
        assert_eq!(outcome.target_path(), Some(Path::new("/tmp/a.doc")));
        assert_eq!(SaveOutcome::Cancelled.target_path(), None);
    }
}
