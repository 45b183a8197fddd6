//! Save operation and change kinds.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kind of save requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveKind {
    /// Save to the document's canonical location.
    Save,
    /// Save to a new location, which becomes the canonical one.
    SaveAs,
    /// Export a copy without changing the document's identity.
    SaveTo,
}

impl SaveKind {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Save => "Save",
            Self::SaveAs => "Save As",
            Self::SaveTo => "Save To",
        }
    }

    /// Whether a successful save of this kind changes the document's file
    /// and clears its edited state.
    pub fn updates_identity(&self) -> bool {
        !matches!(self, Self::SaveTo)
    }
}

/// Kind of change reported to the change tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A content-altering action was performed.
    Done,
    /// An action was undone.
    Undone,
    /// An undone action was redone.
    Redone,
    /// The current state became the saved baseline.
    ClearedAtSave,
}

/// An in-flight persistence request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOperation {
    pub kind: SaveKind,

    /// Where the representation is written.
    pub target_path: PathBuf,

    /// Type tag the representation is encoded as.
    pub type_tag: String,

    /// The document's file before the save, if it had one.
    pub original_path: Option<PathBuf>,
}

impl SaveOperation {
    pub fn new(
        kind: SaveKind,
        target_path: impl Into<PathBuf>,
        type_tag: impl Into<String>,
        original_path: Option<PathBuf>,
    ) -> Self {
        Self {
            kind,
            target_path: target_path.into(),
            type_tag: type_tag.into(),
            original_path,
        }
    }

    /// Whether the write replaces the document's own file.
    pub fn overwrites_original(&self) -> bool {
        self.original_path.as_deref() == Some(self.target_path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_to_keeps_identity() {
        assert!(SaveKind::Save.updates_identity());
        assert!(SaveKind::SaveAs.updates_identity());
        assert!(!SaveKind::SaveTo.updates_identity());
    }

    #[test]
    fn test_overwrites_original() {
        let op = SaveOperation::new(
            SaveKind::Save,
            "/tmp/a.txt",
            "quire.text",
            Some(PathBuf::from("/tmp/a.txt")),
        );
        assert!(op.overwrites_original());

        let export = SaveOperation::new(
            SaveKind::SaveTo,
            "/tmp/a.html",
            "quire.html",
            Some(PathBuf::from("/tmp/a.txt")),
        );
        assert!(!export.overwrites_original());
    }
}
