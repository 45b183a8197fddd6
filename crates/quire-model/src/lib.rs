//! Core data model shared by every Quire crate.
//!
//! A document is persisted through one of two interchangeable
//! [`Representation`] forms: a flat byte blob or a structured [`Package`]
//! (a directory bundle). Which forms and type tags a document class supports
//! is declared by its [`DocumentTypeDescriptor`], looked up through a
//! [`DocumentTypeRegistry`].
//!
//! # Architecture
//!
//! - `representation.rs` - Byte blobs and hierarchical packages
//! - `types.rs` - Document type tags and per-class descriptors
//! - `registry.rs` - Registry collaborator trait and the in-memory registry
//! - `operation.rs` - Save operation kinds and change kinds
//! - `error.rs` - Model errors

mod error;
mod operation;
mod registry;
mod representation;
mod types;

pub use error::{ModelError, Result};
pub use operation::{ChangeKind, SaveKind, SaveOperation};
pub use registry::{DocumentTypeRegistry, TypeRegistry};
pub use representation::{Package, PackageEntry, Representation, RepresentationForm};
pub use types::{DocumentType, DocumentTypeDescriptor, TypeRole};
