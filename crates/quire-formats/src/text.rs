//! Plain text documents.

use quire_document::{DocumentModel, Edit};
use quire_model::{DocumentType, DocumentTypeDescriptor, RepresentationForm, TypeRole};
use quire_persistence::{PersistenceCodec, PersistenceError, Result};

use crate::tags;

/// A document holding a single UTF-8 string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    pub text: String,
}

impl TextDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Native plain text, Markdown import and HTML export.
    pub fn descriptor() -> quire_model::Result<DocumentTypeDescriptor> {
        DocumentTypeDescriptor::new(
            Self::CLASS,
            vec![
                DocumentType::new(tags::TEXT, "Plain Text", RepresentationForm::Bytes)
                    .with_extension("txt")
                    .with_extension("text"),
                DocumentType::new(tags::MARKDOWN, "Markdown", RepresentationForm::Bytes)
                    .with_extension("md")
                    .with_extension("markdown")
                    .with_role(TypeRole::Import),
                DocumentType::new(tags::HTML, "HTML", RepresentationForm::Bytes)
                    .with_extension("html")
                    .with_role(TypeRole::Export),
            ],
        )
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

impl PersistenceCodec for TextDocument {
    fn to_bytes(&self, ty: &DocumentType) -> Result<Vec<u8>> {
        match ty.tag.as_str() {
            tags::TEXT => Ok(self.text.clone().into_bytes()),
            tags::HTML => Ok(to_html(&self.text).into_bytes()),
            _ => Err(PersistenceError::unsupported(&ty.tag, ty.form, "written")),
        }
    }

    fn from_bytes(bytes: &[u8], ty: &DocumentType) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| PersistenceError::corrupt(format!("not valid UTF-8: {e}")))?;
        match ty.tag.as_str() {
            tags::TEXT => Ok(Self::new(text)),
            // Markdown is imported as its source text with Unix line endings
            tags::MARKDOWN => Ok(Self::new(text.replace("\r\n", "\n"))),
            _ => Err(PersistenceError::unsupported(&ty.tag, ty.form, "read")),
        }
    }
}

impl DocumentModel for TextDocument {
    const CLASS: &'static str = "TextDocument";
}

fn to_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    format!("<!DOCTYPE html>\n<html>\n<body>\n<pre>{escaped}</pre>\n</body>\n</html>\n")
}

/// Largest char boundary of `text` not after `offset`.
fn clamp_to_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Insert text at a byte offset.
///
/// Offsets past the end append; offsets inside a character move back to its
/// start.
#[derive(Debug, Clone)]
pub struct InsertText {
    offset: usize,
    text: String,
    applied_at: Option<usize>,
}

impl InsertText {
    pub fn new(offset: usize, text: impl Into<String>) -> Self {
        Self {
            offset,
            text: text.into(),
            applied_at: None,
        }
    }
}

impl Edit<TextDocument> for InsertText {
    fn label(&self) -> &str {
        "Typing"
    }

    fn apply(&mut self, model: &mut TextDocument) {
        let at = clamp_to_boundary(&model.text, self.offset);
        model.text.insert_str(at, &self.text);
        self.applied_at = Some(at);
    }

    fn revert(&mut self, model: &mut TextDocument) {
        if let Some(at) = self.applied_at.take() {
            model.text.replace_range(at..at + self.text.len(), "");
        }
    }
}

/// Delete a byte range, remembering the removed text for undo.
#[derive(Debug, Clone)]
pub struct DeleteText {
    start: usize,
    end: usize,
    removed: Option<(usize, String)>,
}

impl DeleteText {
    pub fn new(range: std::ops::Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            removed: None,
        }
    }
}

impl Edit<TextDocument> for DeleteText {
    fn label(&self) -> &str {
        "Delete"
    }

    /// A range that selects no text deletes nothing.
    fn can_apply(&self, model: &TextDocument) -> bool {
        let start = clamp_to_boundary(&model.text, self.start);
        clamp_to_boundary(&model.text, self.end.max(start)) > start
    }

    fn apply(&mut self, model: &mut TextDocument) {
        let start = clamp_to_boundary(&model.text, self.start);
        let end = clamp_to_boundary(&model.text, self.end.max(start));
        let removed: String = model.text.drain(start..end).collect();
        self.removed = Some((start, removed));
    }

    fn revert(&mut self, model: &mut TextDocument) {
        if let Some((start, removed)) = self.removed.take() {
            model.text.insert_str(start, &removed);
        }
    }
}
