//! Notebook documents: a titled list of notes.
//!
//! The native format is a package:
//!
//! ```text
//! Journal.notebook/
//!   index.json        schema version, notebook title, note titles and files
//!   notes/001.txt     one body per note, in order
//!   notes/002.txt
//! ```
//!
//! A single-file JSON export is also available.

use quire_document::{DocumentModel, Edit};
use quire_model::{DocumentType, DocumentTypeDescriptor, Package, RepresentationForm, TypeRole};
use quire_persistence::{PersistenceCodec, PersistenceError, Result};
use serde::{Deserialize, Serialize};

use crate::tags;

/// Current index schema version.
const SCHEMA_VERSION: u32 = 1;

const INDEX_FILE: &str = "index.json";

/// One note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub body: String,
}

impl Note {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookDocument {
    pub title: String,
    pub notes: Vec<Note>,
}

/// `index.json` contents.
#[derive(Debug, Serialize, Deserialize)]
struct Index {
    schema_version: u32,
    title: String,
    notes: Vec<IndexEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexEntry {
    title: String,
    /// Body file, relative to the package root.
    file: String,
}

/// Single-file export layout.
#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    schema_version: u32,
    #[serde(flatten)]
    notebook: &'a NotebookDocument,
}

impl NotebookDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            notes: Vec::new(),
        }
    }

    /// Native package format and JSON export.
    pub fn descriptor() -> quire_model::Result<DocumentTypeDescriptor> {
        DocumentTypeDescriptor::new(
            Self::CLASS,
            vec![
                DocumentType::new(tags::NOTEBOOK, "Notebook", RepresentationForm::Package)
                    .with_extension("notebook"),
                DocumentType::new(tags::NOTEBOOK_JSON, "Notebook JSON", RepresentationForm::Bytes)
                    .with_extension("json")
                    .with_role(TypeRole::Export),
            ],
        )
    }
}

fn note_file(index: usize) -> String {
    format!("notes/{:03}.txt", index + 1)
}

impl PersistenceCodec for NotebookDocument {
    fn to_package(&self, ty: &DocumentType) -> Result<Package> {
        if ty.tag != tags::NOTEBOOK {
            return Err(PersistenceError::unsupported(&ty.tag, ty.form, "written"));
        }

        let mut package = Package::new();
        let mut entries = Vec::with_capacity(self.notes.len());
        for (i, note) in self.notes.iter().enumerate() {
            let file = note_file(i);
            package
                .insert_file(&file, note.body.as_bytes())
                .map_err(PersistenceError::corrupt)?;
            entries.push(IndexEntry {
                title: note.title.clone(),
                file,
            });
        }

        let index = Index {
            schema_version: SCHEMA_VERSION,
            title: self.title.clone(),
            notes: entries,
        };
        let json = serde_json::to_vec_pretty(&index).map_err(PersistenceError::corrupt)?;
        package
            .insert_file(INDEX_FILE, json)
            .map_err(PersistenceError::corrupt)?;
        Ok(package)
    }

    fn from_package(package: &Package, ty: &DocumentType) -> Result<Self> {
        if ty.tag != tags::NOTEBOOK {
            return Err(PersistenceError::unsupported(&ty.tag, ty.form, "read"));
        }

        let index_bytes = package
            .file(INDEX_FILE)
            .ok_or_else(|| PersistenceError::corrupt(format!("missing {INDEX_FILE}")))?;
        let index: Index = serde_json::from_slice(index_bytes)
            .map_err(|e| PersistenceError::corrupt(format!("invalid {INDEX_FILE}: {e}")))?;

        if index.schema_version > SCHEMA_VERSION {
            return Err(PersistenceError::corrupt(format!(
                "schema version {} is newer than supported version {}",
                index.schema_version, SCHEMA_VERSION
            )));
        }

        let notes = index
            .notes
            .into_iter()
            .map(|entry| {
                let bytes = package
                    .file(&entry.file)
                    .ok_or_else(|| PersistenceError::corrupt(format!("missing {}", entry.file)))?;
                let body = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    PersistenceError::corrupt(format!("{} is not valid UTF-8: {e}", entry.file))
                })?;
                Ok(Note {
                    title: entry.title,
                    body,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            title: index.title,
            notes,
        })
    }

    fn to_bytes(&self, ty: &DocumentType) -> Result<Vec<u8>> {
        if ty.tag != tags::NOTEBOOK_JSON {
            return Err(PersistenceError::unsupported(&ty.tag, ty.form, "written"));
        }
        let export = JsonExport {
            schema_version: SCHEMA_VERSION,
            notebook: self,
        };
        serde_json::to_vec_pretty(&export).map_err(PersistenceError::corrupt)
    }
}

impl DocumentModel for NotebookDocument {
    const CLASS: &'static str = "NotebookDocument";
}

// =============================================================================
// EDITS
// =============================================================================

/// Append a note.
#[derive(Debug, Clone)]
pub struct AddNote(pub Note);

impl Edit<NotebookDocument> for AddNote {
    fn label(&self) -> &str {
        "Add Note"
    }

    fn apply(&mut self, model: &mut NotebookDocument) {
        model.notes.push(self.0.clone());
    }

    fn revert(&mut self, model: &mut NotebookDocument) {
        model.notes.pop();
    }
}

/// Remove the note at an index. Out-of-range indices do nothing.
#[derive(Debug, Clone)]
pub struct RemoveNote {
    index: usize,
    removed: Option<Note>,
}

impl RemoveNote {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            removed: None,
        }
    }
}

impl Edit<NotebookDocument> for RemoveNote {
    fn label(&self) -> &str {
        "Remove Note"
    }

    fn can_apply(&self, model: &NotebookDocument) -> bool {
        self.index < model.notes.len()
    }

    fn apply(&mut self, model: &mut NotebookDocument) {
        if self.can_apply(model) {
            self.removed = Some(model.notes.remove(self.index));
        }
    }

    fn revert(&mut self, model: &mut NotebookDocument) {
        if let Some(note) = self.removed.take() {
            model.notes.insert(self.index, note);
        }
    }
}

/// Replace a note's body.
#[derive(Debug, Clone)]
pub struct EditNote {
    index: usize,
    body: String,
}

impl EditNote {
    pub fn new(index: usize, body: impl Into<String>) -> Self {
        Self {
            index,
            body: body.into(),
        }
    }
}

impl Edit<NotebookDocument> for EditNote {
    fn label(&self) -> &str {
        "Edit Note"
    }

    fn can_apply(&self, model: &NotebookDocument) -> bool {
        self.index < model.notes.len()
    }

    fn apply(&mut self, model: &mut NotebookDocument) {
        if let Some(note) = model.notes.get_mut(self.index) {
            std::mem::swap(&mut note.body, &mut self.body);
        }
    }

    fn revert(&mut self, model: &mut NotebookDocument) {
        self.apply(model);
    }
}

#[derive(Debug, Clone)]
pub struct RenameNotebook(pub String);

impl Edit<NotebookDocument> for RenameNotebook {
    fn label(&self) -> &str {
        "Rename"
    }

    fn apply(&mut self, model: &mut NotebookDocument) {
        std::mem::swap(&mut model.title, &mut self.0);
    }

    fn revert(&mut self, model: &mut NotebookDocument) {
        self.apply(model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(tag: &str) -> DocumentType {
        NotebookDocument::descriptor()
            .unwrap()
            .document_type(tag)
            .unwrap()
            .clone()
    }

    fn journal() -> NotebookDocument {
        NotebookDocument {
            title: "Journal".into(),
            notes: vec![Note::new("Mon", "rain"), Note::new("Tue", "sun")],
        }
    }

    #[test]
    fn test_package_layout() {
        let package = journal().to_package(&ty(tags::NOTEBOOK)).unwrap();

        assert_eq!(package.file("notes/001.txt"), Some(&b"rain"[..]));
        assert_eq!(package.file("notes/002.txt"), Some(&b"sun"[..]));
        let index: serde_json::Value =
            serde_json::from_slice(package.file("index.json").unwrap()).unwrap();
        assert_eq!(index["schema_version"], 1);
        assert_eq!(index["notes"][1]["file"], "notes/002.txt");
    }

    #[test]
    fn test_missing_body_is_corrupt() {
        let mut package = journal().to_package(&ty(tags::NOTEBOOK)).unwrap();
        let mut notes = match package.remove("notes") {
            Some(quire_model::PackageEntry::Directory(notes)) => notes,
            other => panic!("unexpected entry: {other:?}"),
        };
        notes.remove("002.txt");
        package.insert_directory("notes", notes).unwrap();

        let err = NotebookDocument::from_package(&package, &ty(tags::NOTEBOOK)).unwrap_err();
        assert!(err.to_string().contains("notes/002.txt"));
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let mut package = Package::new();
        package
            .insert_file(
                "index.json",
                br#"{"schema_version": 9, "title": "x", "notes": []}"#.to_vec(),
            )
            .unwrap();

        let err = NotebookDocument::from_package(&package, &ty(tags::NOTEBOOK)).unwrap_err();
        assert!(matches!(err, PersistenceError::CorruptData { .. }));
    }

    #[test]
    fn test_json_export_is_flat() {
        let bytes = journal().to_bytes(&ty(tags::NOTEBOOK_JSON)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["title"], "Journal");
        assert_eq!(value["notes"][0]["body"], "rain");
        assert_eq!(value["schema_version"], 1);
    }

    #[test]
    fn test_edits_past_the_last_note_do_not_apply() {
        let doc = journal();
        assert!(RemoveNote::new(1).can_apply(&doc));
        assert!(!RemoveNote::new(2).can_apply(&doc));
        assert!(EditNote::new(0, "fog").can_apply(&doc));
        assert!(!EditNote::new(5, "fog").can_apply(&doc));
    }

    #[test]
    fn test_edits_revert() {
        let mut doc = journal();
        let mut remove = RemoveNote::new(0);
        remove.apply(&mut doc);
        assert_eq!(doc.notes.len(), 1);
        remove.revert(&mut doc);
        assert_eq!(doc, journal());

        let mut edit = EditNote::new(1, "snow");
        edit.apply(&mut doc);
        assert_eq!(doc.notes[1].body, "snow");
        edit.revert(&mut doc);
        assert_eq!(doc, journal());

        let mut rename = RenameNotebook("Diary".into());
        rename.apply(&mut doc);
        assert_eq!(doc.title, "Diary");
        rename.revert(&mut doc);
        assert_eq!(doc.title, "Journal");
    }
}
