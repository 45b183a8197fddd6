//! Collaborators shared by every document of an application.

use std::cell::Cell;
use std::rc::Rc;

use quire_model::DocumentTypeRegistry;
use quire_persistence::{AtomicWriter, FileSystem};

use crate::presenter::Presenter;
use crate::settings::Settings;

/// Hands out the sequence numbers of untitled documents.
#[derive(Debug)]
pub struct UntitledCounter {
    next: Cell<u32>,
}

impl Default for UntitledCounter {
    fn default() -> Self {
        Self { next: Cell::new(1) }
    }
}

impl UntitledCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next index, starting at 1.
    pub fn next_index(&self) -> u32 {
        let index = self.next.get();
        self.next.set(index + 1);
        index
    }
}

/// The file system, type registry, presenter and settings a document uses.
///
/// Cloning is cheap; clones share the same collaborators and untitled counter.
#[derive(Clone)]
pub struct Environment {
    pub fs: Rc<dyn FileSystem>,
    pub registry: Rc<dyn DocumentTypeRegistry>,
    pub presenter: Rc<dyn Presenter>,
    pub settings: Settings,
    pub untitled: Rc<UntitledCounter>,
}

impl Environment {
    pub fn new(
        fs: Rc<dyn FileSystem>,
        registry: Rc<dyn DocumentTypeRegistry>,
        presenter: Rc<dyn Presenter>,
    ) -> Self {
        Self::with_settings(fs, registry, presenter, Settings::default())
    }

    pub fn with_settings(
        fs: Rc<dyn FileSystem>,
        registry: Rc<dyn DocumentTypeRegistry>,
        presenter: Rc<dyn Presenter>,
        settings: Settings,
    ) -> Self {
        Self {
            fs,
            registry,
            presenter,
            settings,
            untitled: Rc::new(UntitledCounter::new()),
        }
    }

    /// An atomic writer over this environment's file system.
    pub fn writer(&self) -> AtomicWriter {
        AtomicWriter::with_options(
            Rc::clone(&self.fs),
            self.settings.persistence.writer_options(),
        )
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("settings", &self.settings)
            .field("untitled", &self.untitled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untitled_counter_starts_at_one() {
        let counter = UntitledCounter::new();
        assert_eq!(counter.next_index(), 1);
        assert_eq!(counter.next_index(), 2);
    }
}
