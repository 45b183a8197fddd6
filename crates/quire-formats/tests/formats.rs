//! Round trips of the bundled formats, through codecs and through documents on disk.

use std::rc::Rc;

use proptest::prelude::*;
use quire_document::{
    ClosePromptRequest, Document, DocumentError, DocumentId, Environment, Presenter,
    RevertPromptRequest, SaveTargetRequest,
};
use quire_formats::{
    AddNote, DeleteText, EditNote, InsertText, Note, NotebookDocument, RemoveNote, TextDocument,
    registry, tags,
};
use quire_model::{DocumentTypeDescriptor, SaveKind};
use quire_persistence::{StdFileSystem, decode, encode};
use tempfile::tempdir;

/// Presenter for documents that are only ever saved to known paths.
struct NoPrompts;

impl Presenter for NoPrompts {
    fn present_save_panel(&self, _document: DocumentId, request: SaveTargetRequest) {
        panic!("unexpected save panel: {request:?}");
    }

    fn present_close_prompt(&self, _document: DocumentId, request: ClosePromptRequest) {
        panic!("unexpected close prompt: {request:?}");
    }

    fn present_revert_prompt(&self, _document: DocumentId, request: RevertPromptRequest) {
        panic!("unexpected revert prompt: {request:?}");
    }
}

fn disk_env() -> Environment {
    Environment::new(
        Rc::new(StdFileSystem),
        Rc::new(registry().unwrap()),
        Rc::new(NoPrompts),
    )
}

fn native_round_trip<M>(model: &M, descriptor: &DocumentTypeDescriptor) -> M
where
    M: quire_persistence::PersistenceCodec,
{
    let tag = descriptor.default_type().unwrap().tag.clone();
    assert!(descriptor.is_native_type(&tag));
    let representation = encode(model, descriptor, &tag).unwrap();
    decode(&representation, descriptor, &tag).unwrap()
}

fn note() -> impl Strategy<Value = Note> {
    (".{0,16}", "(?s).{0,64}").prop_map(|(title, body)| Note::new(title, body))
}

proptest! {
    #[test]
    fn test_text_native_round_trip(text in "(?s).{0,256}") {
        let descriptor = TextDocument::descriptor().unwrap();
        let model = TextDocument::new(text);
        prop_assert_eq!(native_round_trip(&model, &descriptor), model);
    }

    #[test]
    fn test_notebook_native_round_trip(
        title in ".{0,24}",
        notes in proptest::collection::vec(note(), 0..12),
    ) {
        let descriptor = NotebookDocument::descriptor().unwrap();
        let model = NotebookDocument { title, notes };
        prop_assert_eq!(native_round_trip(&model, &descriptor), model);
    }
}

#[test]
fn test_notebook_document_saves_and_reopens_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Journal.notebook");

    let mut doc = Document::new(NotebookDocument::new("Journal"), disk_env()).unwrap();
    doc.perform_edit(AddNote(Note::new("Mon", "rain"))).unwrap();
    doc.perform_edit(AddNote(Note::new("Tue", "sun"))).unwrap();
    doc.save_to_path(SaveKind::SaveAs, &path, tags::NOTEBOOK, |doc, outcome| {
        assert!(outcome.did_save(), "save failed: {:?}", outcome.error());
        assert!(!doc.is_edited());
    })
    .unwrap();

    assert!(path.join("index.json").is_file());
    assert!(path.join("notes").join("002.txt").is_file());

    let reopened = Document::<NotebookDocument>::open_with_extension(&path, disk_env()).unwrap();
    assert_eq!(reopened.model(), doc.model());
    assert_eq!(reopened.display_name(), "Journal.notebook");
}

#[test]
fn test_out_of_range_edits_leave_document_clean() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Log.notebook");
    let mut doc = Document::new(NotebookDocument::new("Log"), disk_env()).unwrap();
    doc.perform_edit(AddNote(Note::new("Mon", "rain"))).unwrap();
    doc.save_to_path(SaveKind::SaveAs, &path, tags::NOTEBOOK, |_, outcome| {
        assert!(outcome.did_save());
    })
    .unwrap();

    for result in [
        doc.perform_edit(RemoveNote::new(1)),
        doc.perform_edit(EditNote::new(4, "sun")),
    ] {
        assert!(matches!(result, Err(DocumentError::EditNotApplicable { .. })));
    }
    assert!(!doc.is_edited());
    assert_eq!(doc.model().notes.len(), 1);

    let mut text = Document::new(TextDocument::new("abc"), disk_env()).unwrap();
    assert!(text.perform_edit(DeleteText::new(3..5)).is_err());
    assert!(!text.is_edited());
}

#[test]
fn test_text_document_exports_html_without_changing_identity() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("notes.txt");
    std::fs::write(&source, "a < b").unwrap();

    let mut doc = Document::<TextDocument>::open_with_extension(&source, disk_env()).unwrap();
    doc.perform_edit(InsertText::new(5, "!")).unwrap();

    let expected = dir.path().join("notes.html");
    let exported = expected.clone();
    doc.save_to_path(SaveKind::SaveTo, dir.path().join("notes"), tags::HTML, move |_, outcome| {
        assert_eq!(outcome.target_path(), Some(exported.as_path()));
    })
    .unwrap();

    let html = std::fs::read_to_string(&expected).unwrap();
    assert!(html.contains("a &lt; b!"));
    assert_eq!(doc.file_path(), Some(source.as_path()));
    assert!(doc.is_edited());
    assert_eq!(std::fs::read_to_string(&source).unwrap(), "a < b");
}

#[test]
fn test_markdown_import_resaves_as_plain_text() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("readme.md");
    std::fs::write(&source, "# Title\r\n").unwrap();

    let mut doc = Document::<TextDocument>::open_with_extension(&source, disk_env()).unwrap();
    assert_eq!(doc.type_tag(), tags::MARKDOWN);
    assert_eq!(doc.model().text, "# Title\n");

    let target = dir.path().join("readme");
    doc.save_to_path(SaveKind::SaveAs, &target, tags::TEXT, |_, outcome| {
        assert!(outcome.did_save());
    })
    .unwrap();

    assert_eq!(doc.type_tag(), tags::TEXT);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("readme.txt")).unwrap(),
        "# Title\n"
    );
}
