//! Integration tests for the command layer against a real directory.

use std::fs;

use quire_cli::commands::{create, export, inspect, list_types, resave};
use quire_cli::session::Session;
use quire_document::Settings;
use quire_formats::tags;
use quire_model::{RepresentationForm, SaveKind, TypeRole};
use tempfile::tempdir;

fn session() -> Session {
    Session::new(Settings::default()).unwrap()
}

fn session_keeping_backups() -> Session {
    let mut settings = Settings::default();
    settings.documents.keep_backup = true;
    Session::new(settings).unwrap()
}

#[test]
fn test_inspect_text_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todo.txt");
    fs::write(&path, "milk\neggs\n").unwrap();

    let report = inspect(&session(), &path).unwrap();

    assert_eq!(report.class, "TextDocument");
    assert_eq!(report.type_tag, tags::TEXT);
    assert_eq!(report.role, TypeRole::Native);
    assert_eq!(report.form, RepresentationForm::Bytes);
    assert_eq!(report.size, 10);
    assert_eq!(report.display_name, "todo.txt");
    assert!(report.details.contains(&("Lines".to_string(), "2".to_string())));
}

#[test]
fn test_inspect_unknown_extension_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("image.png");
    fs::write(&path, [0u8; 4]).unwrap();

    let err = inspect(&session(), &path).unwrap_err();
    assert!(format!("{err:#}").contains(".png"));
}

#[test]
fn test_create_then_inspect_notebook() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Journal.notebook");

    let saved = create(&session(), &path).unwrap();
    assert_eq!(saved.kind, SaveKind::SaveAs);
    assert_eq!(saved.type_tag, tags::NOTEBOOK);
    assert!(path.join("index.json").is_file());

    let report = inspect(&session(), &path).unwrap();
    assert_eq!(report.class, "NotebookDocument");
    assert_eq!(report.form, RepresentationForm::Package);
    assert!(report.details.contains(&("Notes".to_string(), "0".to_string())));
}

#[test]
fn test_create_refuses_existing_and_import_types() {
    let dir = tempdir().unwrap();
    let existing = dir.path().join("a.txt");
    fs::write(&existing, "keep").unwrap();

    assert!(create(&session(), &existing).is_err());
    assert_eq!(fs::read_to_string(&existing).unwrap(), "keep");

    let markdown = dir.path().join("b.md");
    let err = create(&session(), &markdown).unwrap_err();
    assert!(err.to_string().contains("imported"));
    assert!(!markdown.exists());
}

#[test]
fn test_export_picks_type_from_extension() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("page.txt");
    fs::write(&source, "<b>").unwrap();
    let output = dir.path().join("page.html");

    let saved = export(&session(), &source, &output, None).unwrap();

    assert_eq!(saved.kind, SaveKind::SaveTo);
    assert_eq!(saved.type_tag, tags::HTML);
    assert!(fs::read_to_string(&output).unwrap().contains("&lt;b&gt;"));
    assert_eq!(fs::read_to_string(&source).unwrap(), "<b>");
}

#[test]
fn test_export_notebook_to_json_with_explicit_type() {
    let dir = tempdir().unwrap();
    let notebook = dir.path().join("Log.notebook");
    create(&session(), &notebook).unwrap();
    let output = dir.path().join("log-copy");

    let saved = export(&session(), &notebook, &output, Some(tags::NOTEBOOK_JSON)).unwrap();

    assert_eq!(saved.path, dir.path().join("log-copy.json"));
    let json = fs::read_to_string(&saved.path).unwrap();
    assert!(json.contains("\"schema_version\": 1"));
}

#[test]
fn test_export_without_a_matching_type_fails() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("a.txt");
    fs::write(&source, "a").unwrap();

    let err = export(&session(), &source, &dir.path().join("a.pdf"), None).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("--type"));
    assert!(message.contains(tags::HTML));
}

#[test]
fn test_export_rejects_a_read_only_type() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("a.txt");
    fs::write(&source, "a").unwrap();

    let result = export(
        &session(),
        &source,
        &dir.path().join("a.md"),
        Some(tags::MARKDOWN),
    );

    assert!(result.is_err());
    assert!(!dir.path().join("a.md").exists());
}

#[test]
fn test_resave_native_in_place_with_backup() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "hello").unwrap();

    let saved = resave(&session_keeping_backups(), &path).unwrap();

    assert_eq!(saved.kind, SaveKind::Save);
    assert_eq!(saved.path, path);
    let backup = saved.backup_path.unwrap();
    assert_eq!(backup, dir.path().join("notes.txt~"));
    assert_eq!(fs::read_to_string(&backup).unwrap(), "hello");
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
}

#[test]
fn test_resave_without_backup_leaves_no_extra_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "hello").unwrap();

    let saved = resave(&session(), &path).unwrap();

    assert!(saved.backup_path.is_none());
    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["notes.txt".to_string()]);
}

#[test]
fn test_resave_import_writes_native_sibling() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("readme.md");
    fs::write(&source, "# Hi\r\n").unwrap();

    let session = session();
    let saved = resave(&session, &source).unwrap();

    assert_eq!(saved.kind, SaveKind::SaveAs);
    assert_eq!(saved.path, dir.path().join("readme.txt"));
    assert_eq!(saved.type_tag, tags::TEXT);
    assert_eq!(fs::read_to_string(&saved.path).unwrap(), "# Hi\n");
    assert_eq!(fs::read_to_string(&source).unwrap(), "# Hi\r\n");
    assert_eq!(session.presenter.pending(), 0);
}

#[test]
fn test_list_types_covers_bundled_classes() {
    let rows = list_types(&session());

    assert_eq!(rows.len(), 5);
    let html = rows.iter().find(|row| row.tag == tags::HTML).unwrap();
    assert_eq!(html.class, "TextDocument");
    assert_eq!(html.role, TypeRole::Export);
    assert_eq!(html.extensions, vec!["html"]);

    // Classes come out in name order
    assert_eq!(rows[0].class, "NotebookDocument");
}
