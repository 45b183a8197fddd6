//! Conversion between document models and their representations.
//!
//! A model implements the half of [`PersistenceCodec`] matching the forms it
//! supports. The [`encode`] and [`decode`] helpers check the requested tag
//! against the class descriptor first, so a model never sees a tag it did not
//! declare.

use quire_model::{
    DocumentType, DocumentTypeDescriptor, Package, Representation, RepresentationForm,
};

use crate::error::{PersistenceError, Result};

/// Trait for document models that can be persisted.
///
/// Every method defaults to [`PersistenceError::UnsupportedType`], so a
/// model that only has a flat format implements `to_bytes`/`from_bytes`
/// and the package form is rejected rather than silently degraded.
pub trait PersistenceCodec: Sized {
    /// Encode as a flat byte blob.
    fn to_bytes(&self, ty: &DocumentType) -> Result<Vec<u8>> {
        Err(PersistenceError::unsupported(
            &ty.tag,
            RepresentationForm::Bytes,
            "written",
        ))
    }

    /// Decode from a flat byte blob.
    fn from_bytes(_bytes: &[u8], ty: &DocumentType) -> Result<Self> {
        Err(PersistenceError::unsupported(
            &ty.tag,
            RepresentationForm::Bytes,
            "read",
        ))
    }

    /// Encode as a structured package.
    fn to_package(&self, ty: &DocumentType) -> Result<Package> {
        Err(PersistenceError::unsupported(
            &ty.tag,
            RepresentationForm::Package,
            "written",
        ))
    }

    /// Decode from a structured package.
    fn from_package(_package: &Package, ty: &DocumentType) -> Result<Self> {
        Err(PersistenceError::unsupported(
            &ty.tag,
            RepresentationForm::Package,
            "read",
        ))
    }
}

/// Encode `model` as the type `tag`, which must be writable by the class.
pub fn encode<M: PersistenceCodec>(
    model: &M,
    descriptor: &DocumentTypeDescriptor,
    tag: &str,
) -> Result<Representation> {
    let ty = descriptor
        .document_type(tag)
        .filter(|ty| ty.is_writable())
        .ok_or_else(|| unknown(descriptor, tag, "written"))?;

    match ty.form {
        RepresentationForm::Bytes => model.to_bytes(ty).map(Representation::Bytes),
        RepresentationForm::Package => model.to_package(ty).map(Representation::Package),
    }
}

/// Decode a representation of type `tag`, which must be readable by the class.
pub fn decode<M: PersistenceCodec>(
    representation: &Representation,
    descriptor: &DocumentTypeDescriptor,
    tag: &str,
) -> Result<M> {
    let ty = descriptor
        .document_type(tag)
        .filter(|ty| ty.is_readable())
        .ok_or_else(|| unknown(descriptor, tag, "read"))?;

    match (ty.form, representation) {
        (RepresentationForm::Bytes, Representation::Bytes(bytes)) => M::from_bytes(bytes, ty),
        (RepresentationForm::Package, Representation::Package(package)) => {
            M::from_package(package, ty)
        }
        (expected, found) => Err(PersistenceError::corrupt(format!(
            "expected a {} but found a {}",
            expected.label(),
            found.form().label()
        ))),
    }
}

fn unknown(descriptor: &DocumentTypeDescriptor, tag: &str, operation: &'static str) -> PersistenceError {
    let form = descriptor
        .document_type(tag)
        .map(|ty| ty.form)
        .unwrap_or_default();
    PersistenceError::unsupported(tag, form, operation)
}
