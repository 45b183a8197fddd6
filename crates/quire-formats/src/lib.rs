//! Concrete document models.
//!
//! - [`TextDocument`] - plain UTF-8 text, stored as a flat file
//! - [`NotebookDocument`] - titled notes, stored as a directory package
//!
//! [`registry`] returns a type registry with both classes registered.

mod notebook;
mod text;

use quire_model::TypeRegistry;

pub use notebook::{AddNote, EditNote, Note, NotebookDocument, RemoveNote, RenameNotebook};
pub use text::{DeleteText, InsertText, TextDocument};

/// Type tags declared by the bundled classes.
pub mod tags {
    pub const TEXT: &str = "quire.text";
    pub const MARKDOWN: &str = "quire.markdown";
    pub const HTML: &str = "quire.html";
    pub const NOTEBOOK: &str = "quire.notebook";
    pub const NOTEBOOK_JSON: &str = "quire.notebook-json";
}

/// A registry with every bundled document class.
pub fn registry() -> quire_model::Result<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    registry.register(TextDocument::descriptor()?)?;
    registry.register(NotebookDocument::descriptor()?)?;
    Ok(registry)
}
