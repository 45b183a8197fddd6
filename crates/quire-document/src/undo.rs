//! Undo/redo log.

use crossbeam_channel::{Receiver, Sender, unbounded};

/// A reversible change to a document model.
pub trait Edit<M> {
    /// Short description for "Undo <label>" menu items.
    fn label(&self) -> &str {
        "Edit"
    }

    /// Whether the edit fits `model` as it is now.
    fn can_apply(&self, _model: &M) -> bool {
        true
    }

    fn apply(&mut self, model: &mut M);

    fn revert(&mut self, model: &mut M);
}

/// Change notification published by the undo log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoEvent {
    Done,
    Undone,
    Redone,
    /// Both stacks were emptied.
    Cleared,
}

/// Stack of reversible edits with a change-event stream.
pub struct UndoLog<M> {
    undo_stack: Vec<Box<dyn Edit<M>>>,
    redo_stack: Vec<Box<dyn Edit<M>>>,
    subscribers: Vec<Sender<UndoEvent>>,
    /// Maximum undo depth; 0 means unlimited.
    limit: usize,
}

impl<M> Default for UndoLog<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> std::fmt::Debug for UndoLog<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoLog")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("limit", &self.limit)
            .finish()
    }
}

impl<M> UndoLog<M> {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            subscribers: Vec::new(),
            limit: 0,
        }
    }

    /// Create a log that keeps at most `limit` undoable edits.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::new()
        }
    }

    /// Subscribe to change events.
    pub fn subscribe(&mut self) -> Receiver<UndoEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Record an edit that has already been applied to the model.
    ///
    /// Clears the redo stack.
    pub fn record(&mut self, edit: Box<dyn Edit<M>>) {
        self.redo_stack.clear();
        self.undo_stack.push(edit);
        if self.limit > 0 && self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
        self.publish(UndoEvent::Done);
    }

    /// Revert the most recent edit. Returns false if there was nothing to undo.
    pub fn undo(&mut self, model: &mut M) -> bool {
        let Some(mut edit) = self.undo_stack.pop() else {
            return false;
        };
        edit.revert(model);
        self.redo_stack.push(edit);
        self.publish(UndoEvent::Undone);
        true
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&mut self, model: &mut M) -> bool {
        let Some(mut edit) = self.redo_stack.pop() else {
            return false;
        };
        edit.apply(model);
        self.undo_stack.push(edit);
        self.publish(UndoEvent::Redone);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(|edit| edit.label())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(|edit| edit.label())
    }

    /// Drop every recorded edit.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.publish(UndoEvent::Cleared);
    }

    fn publish(&mut self, event: UndoEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}
