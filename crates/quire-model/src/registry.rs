//! Document-type registry collaborator.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ModelError, Result};
use crate::types::{DocumentType, DocumentTypeDescriptor};

/// Maps document classes to their type descriptors.
///
/// The document core consults the registry but never owns it; the
/// application's document controller does.
pub trait DocumentTypeRegistry {
    /// Descriptor for a document class.
    fn descriptor(&self, class: &str) -> Option<Arc<DocumentTypeDescriptor>>;

    /// The class and readable type that open files with `extension`.
    fn type_for_extension(&self, extension: &str) -> Option<(Arc<DocumentTypeDescriptor>, DocumentType)>;
}

/// In-memory registry keyed by class name.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    classes: BTreeMap<String, Arc<DocumentTypeDescriptor>>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document class.
    pub fn register(&mut self, descriptor: DocumentTypeDescriptor) -> Result<Arc<DocumentTypeDescriptor>> {
        if self.classes.contains_key(&descriptor.class) {
            return Err(ModelError::DuplicateClass {
                class: descriptor.class,
            });
        }
        let descriptor = Arc::new(descriptor);
        self.classes
            .insert(descriptor.class.clone(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Registered class names in sorted order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}

impl DocumentTypeRegistry for TypeRegistry {
    fn descriptor(&self, class: &str) -> Option<Arc<DocumentTypeDescriptor>> {
        self.classes.get(class).cloned()
    }

    fn type_for_extension(&self, extension: &str) -> Option<(Arc<DocumentTypeDescriptor>, DocumentType)> {
        self.classes.values().find_map(|descriptor| {
            descriptor
                .type_for_extension(extension)
                .map(|ty| (Arc::clone(descriptor), ty.clone()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::representation::RepresentationForm;

    fn text_descriptor() -> DocumentTypeDescriptor {
        DocumentTypeDescriptor::new(
            "TextDocument",
            vec![DocumentType::new("quire.text", "Text", RepresentationForm::Bytes).with_extension("txt")],
        )
        .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = TypeRegistry::new();
        registry.register(text_descriptor()).unwrap();

        assert!(registry.descriptor("TextDocument").is_some());
        assert!(registry.descriptor("Other").is_none());

        let (descriptor, ty) = registry.type_for_extension("txt").unwrap();
        assert_eq!(descriptor.class, "TextDocument");
        assert_eq!(ty.tag, "quire.text");
    }

    #[test]
    fn test_duplicate_class_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register(text_descriptor()).unwrap();
        assert!(matches!(
            registry.register(text_descriptor()),
            Err(ModelError::DuplicateClass { .. })
        ));
    }
}
