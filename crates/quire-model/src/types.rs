//! Document type tags and per-class type descriptors.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::operation::SaveKind;
use crate::representation::RepresentationForm;

/// How a document class relates to a type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeRole {
    /// The application's own format: readable and writable.
    #[default]
    Native,
    /// A foreign format that can only be opened.
    Import,
    /// A foreign format that can only be written (export).
    Export,
}

/// A single document type (file format) a class understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    /// Type tag (e.g., "quire.text").
    pub tag: String,

    /// Human-readable name shown in save panels.
    pub name: String,

    /// File extensions without the leading dot. The first one is preferred.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// On-disk representation used for this type.
    #[serde(default)]
    pub form: RepresentationForm,

    #[serde(default)]
    pub role: TypeRole,
}

impl DocumentType {
    /// Create a new native type.
    pub fn new(
        tag: impl Into<String>,
        name: impl Into<String>,
        form: RepresentationForm,
    ) -> Self {
        Self {
            tag: tag.into(),
            name: name.into(),
            extensions: Vec::new(),
            form,
            role: TypeRole::Native,
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: TypeRole) -> Self {
        self.role = role;
        self
    }

    pub fn is_readable(&self) -> bool {
        matches!(self.role, TypeRole::Native | TypeRole::Import)
    }

    pub fn is_writable(&self) -> bool {
        matches!(self.role, TypeRole::Native | TypeRole::Export)
    }

    /// Preferred file extension, if any.
    pub fn primary_extension(&self) -> Option<&str> {
        self.extensions.first().map(String::as_str)
    }

    /// Check whether `extension` (without dot) belongs to this type.
    pub fn matches_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// The set of types a document class can read and write.
///
/// This is the per-class descriptor consulted instead of type-wide static
/// queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTypeDescriptor {
    /// Document class name (e.g., "TextDocument").
    pub class: String,

    /// Declared types, in preference order.
    pub types: Vec<DocumentType>,
}

impl DocumentTypeDescriptor {
    /// Create a descriptor, validating that it declares at least one type
    /// and no duplicate tags.
    pub fn new(class: impl Into<String>, types: Vec<DocumentType>) -> Result<Self> {
        let class = class.into();
        if types.is_empty() {
            return Err(ModelError::EmptyDescriptor { class });
        }
        for (i, ty) in types.iter().enumerate() {
            if types[..i].iter().any(|other| other.tag == ty.tag) {
                return Err(ModelError::DuplicateType {
                    class,
                    tag: ty.tag.clone(),
                });
            }
        }
        Ok(Self { class, types })
    }

    /// Look up a declared type by tag.
    pub fn document_type(&self, tag: &str) -> Option<&DocumentType> {
        self.types.iter().find(|ty| ty.tag == tag)
    }

    /// Tags this class can open.
    pub fn readable_types(&self) -> Vec<&str> {
        self.types
            .iter()
            .filter(|ty| ty.is_readable())
            .map(|ty| ty.tag.as_str())
            .collect()
    }

    /// Tags this class can write.
    pub fn writable_types(&self) -> Vec<&str> {
        self.types
            .iter()
            .filter(|ty| ty.is_writable())
            .map(|ty| ty.tag.as_str())
            .collect()
    }

    pub fn is_native_type(&self, tag: &str) -> bool {
        self.document_type(tag)
            .is_some_and(|ty| ty.role == TypeRole::Native)
    }

    pub fn is_readable(&self, tag: &str) -> bool {
        self.document_type(tag).is_some_and(DocumentType::is_readable)
    }

    pub fn is_writable(&self, tag: &str) -> bool {
        self.document_type(tag).is_some_and(DocumentType::is_writable)
    }

    /// The type new untitled documents start with: the first native type,
    /// falling back to the first declared type. `None` only for a descriptor
    /// built without [`DocumentTypeDescriptor::new`] that declares no types.
    pub fn default_type(&self) -> Option<&DocumentType> {
        self.types
            .iter()
            .find(|ty| ty.role == TypeRole::Native)
            .or_else(|| self.types.first())
    }

    /// Readable type whose extensions include `extension`.
    pub fn type_for_extension(&self, extension: &str) -> Option<&DocumentType> {
        self.types
            .iter()
            .find(|ty| ty.is_readable() && ty.matches_extension(extension))
    }

    /// Types offered by the save panel for a given save kind.
    ///
    /// `SaveTo` is an export and offers every writable type. `Save` and
    /// `SaveAs` change the document's canonical file, so they only offer
    /// types the document can read back.
    pub fn types_for_save(&self, kind: SaveKind) -> Vec<&DocumentType> {
        self.types
            .iter()
            .filter(|ty| match kind {
                SaveKind::SaveTo => ty.is_writable(),
                SaveKind::Save | SaveKind::SaveAs => ty.is_writable() && ty.is_readable(),
            })
            .collect()
    }
}
