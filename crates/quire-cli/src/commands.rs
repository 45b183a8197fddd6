//! Command implementations.
//!
//! Each command opens what it needs through a [`Session`], runs one document
//! operation to completion and returns a report for the binary to print.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use quire_document::{Document, DocumentModel, Outcome, SavedDocument};
use quire_formats::{NotebookDocument, TextDocument};
use quire_model::{DocumentTypeDescriptor, DocumentTypeRegistry, RepresentationForm, SaveKind, TypeRole};
use quire_persistence::read_representation;

use crate::session::{HeadlessPresenter, Session, drive};
use crate::with_document;

/// What `inspect` found.
#[derive(Debug, Clone)]
pub struct InspectReport {
    pub path: PathBuf,
    pub display_name: String,
    pub class: &'static str,
    pub type_tag: String,
    pub type_name: String,
    pub role: TypeRole,
    pub form: RepresentationForm,
    /// Bytes on disk, summed over every file for packages.
    pub size: u64,
    pub details: Vec<(String, String)>,
}

/// One registered document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRow {
    pub class: String,
    pub tag: String,
    pub name: String,
    pub role: TypeRole,
    pub form: RepresentationForm,
    pub extensions: Vec<String>,
}

pub fn inspect(session: &Session, path: &Path) -> Result<InspectReport> {
    let mut document = session
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let class = document.class();
    let details = document.details();
    let report = with_document!(&mut document, doc => {
        let ty = doc
            .document_type()
            .ok_or_else(|| anyhow!("{} has no document type", doc.display_name()))?
            .clone();
        let size = read_representation(session.environment().fs.as_ref(), path, ty.form)?.size();
        let report = InspectReport {
            path: path.to_path_buf(),
            display_name: doc.display_name(),
            class,
            type_tag: ty.tag,
            type_name: ty.name,
            role: ty.role,
            form: ty.form,
            size,
            details,
        };
        doc.close();
        report
    });
    Ok(report)
}

/// Write a copy of `path` to `output` without changing the source.
///
/// Without an explicit type the output extension picks one.
pub fn export(
    session: &Session,
    path: &Path,
    output: &Path,
    type_tag: Option<&str>,
) -> Result<SavedDocument> {
    let mut document = session
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;

    with_document!(&mut document, doc => {
        let tag = match type_tag {
            Some(tag) => tag.to_string(),
            None => export_type_for(doc.descriptor(), output)?,
        };
        let outcome = drive(doc, &session.presenter, |doc, done| {
            doc.save_to_path(SaveKind::SaveTo, output.to_path_buf(), &tag, done)
        })?;
        let saved = completed(outcome, "export")?;
        doc.close();
        Ok(saved)
    })
}

/// Save `path` in place.
///
/// Files opened through an import type cannot be written back; they are
/// saved under the suggested name in the class's default type.
pub fn resave(session: &Session, path: &Path) -> Result<SavedDocument> {
    let mut document = session
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;

    with_document!(&mut document, doc => save_and_close(doc, &session.presenter))
}

/// Create an empty document of the class that owns `path`'s extension.
pub fn create(session: &Session, path: &Path) -> Result<SavedDocument> {
    if session.environment().fs.exists(path) {
        bail!("{} already exists", path.display());
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| anyhow!("{} has no file extension", path.display()))?;
    let (descriptor, ty) = session
        .registry
        .type_for_extension(extension)
        .ok_or_else(|| anyhow!("no document class saves .{extension} files"))?;
    if ty.role != TypeRole::Native {
        bail!("{} files can only be imported", ty.name);
    }

    match descriptor.class.as_str() {
        TextDocument::CLASS => create_document::<TextDocument>(session, path, &ty.tag),
        NotebookDocument::CLASS => create_document::<NotebookDocument>(session, path, &ty.tag),
        other => bail!("document class {other} is not supported by the command line"),
    }
}

/// Every registered type, grouped by class.
pub fn list_types(session: &Session) -> Vec<TypeRow> {
    session
        .registry
        .classes()
        .filter_map(|class| session.registry.descriptor(class))
        .flat_map(|descriptor| {
            descriptor
                .types
                .iter()
                .map(|ty| TypeRow {
                    class: descriptor.class.clone(),
                    tag: ty.tag.clone(),
                    name: ty.name.clone(),
                    role: ty.role,
                    form: ty.form,
                    extensions: ty.extensions.clone(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn create_document<M: DocumentModel + Default>(
    session: &Session,
    path: &Path,
    type_tag: &str,
) -> Result<SavedDocument> {
    let mut doc = Document::<M>::untitled(session.environment().clone())?;
    let outcome = drive(&mut doc, &session.presenter, |doc, done| {
        doc.save_to_path(SaveKind::SaveAs, path.to_path_buf(), type_tag, done)
    })?;
    let saved = completed(outcome, "create")?;
    doc.close();
    Ok(saved)
}

fn save_and_close<M: DocumentModel>(
    doc: &mut Document<M>,
    presenter: &HeadlessPresenter,
) -> Result<SavedDocument> {
    let outcome = drive(doc, presenter, |doc, done| doc.save(SaveKind::Save, done))?;
    let saved = completed(outcome, "save")?;
    doc.close();
    Ok(saved)
}

fn export_type_for(descriptor: &DocumentTypeDescriptor, output: &Path) -> Result<String> {
    let candidates = descriptor.types_for_save(SaveKind::SaveTo);
    let extension = output.extension().and_then(|ext| ext.to_str());
    if let Some(extension) = extension
        && let Some(ty) = candidates.iter().find(|ty| ty.matches_extension(extension))
    {
        return Ok(ty.tag.clone());
    }

    let available: Vec<&str> = candidates.iter().map(|ty| ty.tag.as_str()).collect();
    bail!(
        "cannot tell the export type from {}; pass --type with one of: {}",
        output.display(),
        available.join(", ")
    )
}

fn completed<T>(outcome: Outcome<T>, operation: &str) -> Result<T> {
    match outcome {
        Outcome::Completed(value) => Ok(value),
        Outcome::Cancelled => bail!("{operation} was cancelled"),
        Outcome::Failed(err) => Err(anyhow::Error::new(err).context(format!("{operation} failed"))),
    }
}
