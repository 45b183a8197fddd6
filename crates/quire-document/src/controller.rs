//! Window controllers attached to a document.

use std::collections::VecDeque;
use std::fmt;

use crate::document::DocumentId;
use crate::error::{DocumentError, Result};

/// Identifier assigned to a controller when it is added to a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(pub(crate) u32);

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A presentation surface bound to one document.
///
/// The core only decides *when* a controller is loaded, shown, asked to
/// close, or torn down; what it draws is up to the toolkit.
pub trait WindowController {
    /// The document this controller is attached to, if any.
    fn document(&self) -> Option<DocumentId>;

    /// Called when the controller is added to a document.
    fn attach(&mut self, document: DocumentId);

    /// Called when the controller is removed from its document.
    fn detach(&mut self);

    /// Whether the controller loads its interface lazily, with will/did-load
    /// notifications delivered to the document model.
    fn needs_deferred_load(&self) -> bool {
        false
    }

    /// Load the interface. Only called for deferred controllers.
    fn load(&mut self) {}

    /// Bring the surface on screen.
    fn show(&mut self) {}

    /// Veto point before the document closes (e.g. a sheet is still open).
    fn should_close(&mut self) -> bool {
        true
    }

    /// Whether closing this controller closes the whole document even when
    /// other controllers remain.
    fn closes_document(&self) -> bool {
        false
    }

    /// Tear down the surface.
    fn close(&mut self) {}
}

/// Ordered collection of the controllers presenting one document.
pub struct WindowControllerRegistry {
    document: DocumentId,
    entries: Vec<(ControllerId, Box<dyn WindowController>)>,
    pending_loads: VecDeque<ControllerId>,
    next_id: u32,
}

impl fmt::Debug for WindowControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowControllerRegistry")
            .field("document", &self.document)
            .field("controllers", &self.ids())
            .field("pending_loads", &self.pending_loads)
            .finish()
    }
}

impl WindowControllerRegistry {
    pub fn new(document: DocumentId) -> Self {
        Self {
            document,
            entries: Vec::new(),
            pending_loads: VecDeque::new(),
            next_id: 1,
        }
    }

    /// Append a controller and attach it to this registry's document.
    ///
    /// A controller that still belongs to another document is rejected.
    pub fn add(&mut self, mut controller: Box<dyn WindowController>) -> Result<ControllerId> {
        if let Some(owner) = controller.document()
            && owner != self.document
        {
            return Err(DocumentError::ControllerAlreadyAttached { document: owner });
        }

        let id = ControllerId(self.next_id);
        self.next_id += 1;

        controller.attach(self.document);
        if controller.needs_deferred_load() {
            self.pending_loads.push_back(id);
        }
        self.entries.push((id, controller));
        Ok(id)
    }

    /// Detach and return a controller.
    pub fn remove(&mut self, id: ControllerId) -> Result<Box<dyn WindowController>> {
        let index = self
            .entries
            .iter()
            .position(|(entry_id, _)| *entry_id == id)
            .ok_or(DocumentError::UnknownController { id })?;

        let (_, mut controller) = self.entries.remove(index);
        self.pending_loads.retain(|pending| *pending != id);
        controller.detach();
        Ok(controller)
    }

    /// All controllers in registration order.
    pub fn all(&self) -> impl Iterator<Item = (ControllerId, &dyn WindowController)> {
        self.entries
            .iter()
            .map(|(id, controller)| (*id, controller.as_ref()))
    }

    pub fn ids(&self) -> Vec<ControllerId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    pub fn get(&self, id: ControllerId) -> Option<&dyn WindowController> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, controller)| controller.as_ref())
    }

    pub fn get_mut(&mut self, id: ControllerId) -> Option<&mut (dyn WindowController + 'static)> {
        self.entries
            .iter_mut()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, controller)| controller.as_mut())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Next controller waiting for its deferred load, in registration order.
    pub(crate) fn next_pending_load(&mut self) -> Option<ControllerId> {
        self.pending_loads.pop_front()
    }

    /// Ask each controller in order whether it may close.
    ///
    /// Stops at the first veto, which is returned; later controllers are
    /// not asked.
    pub(crate) fn first_veto(&mut self) -> Option<ControllerId> {
        for (id, controller) in &mut self.entries {
            if !controller.should_close() {
                return Some(*id);
            }
        }
        None
    }

    pub(crate) fn show_all(&mut self) {
        for (_, controller) in &mut self.entries {
            controller.show();
        }
    }

    /// Close and detach every controller in registration order.
    pub(crate) fn tear_down(&mut self) {
        self.pending_loads.clear();
        for (_, mut controller) in self.entries.drain(..) {
            controller.close();
            controller.detach();
        }
    }
}
