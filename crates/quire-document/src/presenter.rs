//! Presentation-toolkit collaborator.
//!
//! The document never shows a panel itself. It describes what it needs in a
//! request, hands it to the [`Presenter`], and waits for the application to
//! call the matching `resume_*` method on the document.

use std::path::PathBuf;

use quire_model::{DocumentType, SaveKind};

use crate::document::DocumentId;

/// What the save panel should offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTargetRequest {
    pub kind: SaveKind,

    /// File name to pre-fill, without directory.
    pub suggested_name: String,

    /// Directory to start in, if the document already has a file.
    pub directory: Option<PathBuf>,

    /// Types the user may choose from, in preference order.
    pub allowed_types: Vec<DocumentType>,

    /// Tag to pre-select.
    pub default_type: String,
}

/// The user's answer to a save panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTarget {
    pub path: PathBuf,
    pub type_tag: String,
}

impl SaveTarget {
    pub fn new(path: impl Into<PathBuf>, type_tag: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            type_tag: type_tag.into(),
        }
    }
}

/// "Save changes before closing?" prompt contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosePromptRequest {
    pub display_name: String,
    pub file_path: Option<PathBuf>,
}

/// The user's answer to the close prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    Save,
    Discard,
    Cancel,
}

/// "Revert to the saved version?" prompt contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevertPromptRequest {
    pub display_name: String,
    pub file_path: PathBuf,
}

/// Shows prompts on behalf of documents.
///
/// Implementations must not call back into the document from these methods;
/// answers are delivered later through the document's `resume_*` methods.
pub trait Presenter {
    fn present_save_panel(&self, document: DocumentId, request: SaveTargetRequest);

    fn present_close_prompt(&self, document: DocumentId, request: ClosePromptRequest);

    fn present_revert_prompt(&self, document: DocumentId, request: RevertPromptRequest);

    /// The document finished closing and should be forgotten.
    fn document_did_close(&self, _document: DocumentId) {}
}
