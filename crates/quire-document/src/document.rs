//! The document aggregate.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::Receiver;
use quire_model::{ChangeKind, DocumentType, DocumentTypeDescriptor};
use quire_persistence::{PersistenceCodec, PersistenceError, decode, read_representation};

use crate::change::ChangeTracker;
use crate::controller::{ControllerId, WindowController, WindowControllerRegistry};
use crate::environment::Environment;
use crate::error::{DocumentError, Outcome, Result};
use crate::lifecycle::Pending;
use crate::undo::{Edit, UndoEvent, UndoLog};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub(crate) u64);

impl DocumentId {
    fn next() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Application-specific document content.
pub trait DocumentModel: PersistenceCodec + 'static {
    /// Class name the type registry knows this model by.
    const CLASS: &'static str;

    /// Controllers to create the first time the document's windows are shown.
    fn make_window_controllers(&self) -> Vec<Box<dyn WindowController>> {
        Vec::new()
    }

    fn window_controller_will_load(&mut self, _controller: &dyn WindowController) {}

    fn window_controller_did_load(&mut self, _controller: &dyn WindowController) {}

    /// Override the `keep_backup` setting for this model.
    fn keep_backup_file(&self) -> Option<bool> {
        None
    }
}

/// Where a document is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Clean,
    Edited,
    /// Waiting for a save location.
    SavePending,
    /// Waiting for the close prompt, or for the save it asked for.
    ClosePending,
    /// Waiting for the revert confirmation.
    RevertPending,
    Closed,
}

/// User actions whose availability the document reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentAction {
    Save,
    SaveAs,
    SaveTo,
    Revert,
    Close,
    Undo,
    Redo,
}

/// A unit of user work, optionally backed by a file.
pub struct Document<M: DocumentModel> {
    pub(crate) id: DocumentId,
    pub(crate) model: M,
    pub(crate) descriptor: Arc<DocumentTypeDescriptor>,
    pub(crate) file_path: Option<PathBuf>,
    pub(crate) type_tag: String,
    /// 0 for documents opened from a file.
    pub(crate) untitled_index: u32,
    pub(crate) changes: ChangeTracker,
    pub(crate) undo: UndoLog<M>,
    pub(crate) undo_events: Receiver<UndoEvent>,
    pub(crate) controllers: WindowControllerRegistry,
    pub(crate) env: Environment,
    pub(crate) pending: Option<Pending<M>>,
    pub(crate) closed: bool,
}

impl<M: DocumentModel> fmt::Debug for Document<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("class", &M::CLASS)
            .field("file_path", &self.file_path)
            .field("type_tag", &self.type_tag)
            .field("state", &self.state())
            .field("changes", &self.changes)
            .field("controllers", &self.controllers)
            .finish_non_exhaustive()
    }
}

impl<M: DocumentModel + Default> Document<M> {
    /// A new, empty, untitled document.
    pub fn untitled(env: Environment) -> Result<Self> {
        Self::new(M::default(), env)
    }
}

impl<M: DocumentModel> Document<M> {
    /// Wrap `model` in a new untitled document of the class's default type.
    pub fn new(model: M, env: Environment) -> Result<Self> {
        let descriptor = descriptor_for::<M>(&env)?;
        let type_tag = descriptor
            .default_type()
            .map(|ty| ty.tag.clone())
            .ok_or_else(|| DocumentError::NoDocumentTypes {
                class: M::CLASS.to_string(),
            })?;
        let untitled_index = env.untitled.next_index();

        tracing::debug!("New untitled {} document", M::CLASS);
        Ok(Self::assemble(model, descriptor, None, type_tag, untitled_index, env))
    }

    /// Read and decode the file at `path` as type `type_tag`.
    pub fn open(path: impl AsRef<Path>, type_tag: &str, env: Environment) -> Result<Self> {
        let path = path.as_ref();
        let descriptor = descriptor_for::<M>(&env)?;
        let ty = descriptor
            .document_type(type_tag)
            .filter(|ty| ty.is_readable())
            .ok_or_else(|| {
                let form = descriptor
                    .document_type(type_tag)
                    .map(|ty| ty.form)
                    .unwrap_or_default();
                PersistenceError::unsupported(type_tag, form, "read")
            })?;

        let representation = read_representation(env.fs.as_ref(), path, ty.form)?;
        let model: M =
            decode(&representation, &descriptor, type_tag).map_err(|e| e.with_path(path))?;

        tracing::info!("Opened {} as {}", path.display(), type_tag);
        Ok(Self::assemble(
            model,
            descriptor,
            Some(path.to_path_buf()),
            type_tag.to_string(),
            0,
            env,
        ))
    }

    /// Open `path`, picking the readable type from its extension.
    pub fn open_with_extension(path: impl AsRef<Path>, env: Environment) -> Result<Self> {
        let path = path.as_ref();
        let descriptor = descriptor_for::<M>(&env)?;
        let tag = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| descriptor.type_for_extension(ext))
            .map(|ty| ty.tag.clone())
            .ok_or_else(|| DocumentError::UnknownExtension {
                path: path.to_path_buf(),
            })?;
        Self::open(path, &tag, env)
    }

    fn assemble(
        model: M,
        descriptor: Arc<DocumentTypeDescriptor>,
        file_path: Option<PathBuf>,
        type_tag: String,
        untitled_index: u32,
        env: Environment,
    ) -> Self {
        let id = DocumentId::next();
        let mut undo = UndoLog::with_limit(env.settings.documents.undo_limit);
        let undo_events = undo.subscribe();
        Self {
            id,
            model,
            descriptor,
            file_path,
            type_tag,
            untitled_index,
            changes: ChangeTracker::new(),
            undo,
            undo_events,
            controllers: WindowControllerRegistry::new(id),
            env,
            pending: None,
            closed: false,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Direct access to the model.
    ///
    /// Changes made here bypass the undo log; report them with
    /// [`Document::update_change_count`].
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn document_type(&self) -> Option<&DocumentType> {
        self.descriptor.document_type(&self.type_tag)
    }

    pub fn descriptor(&self) -> &DocumentTypeDescriptor {
        &self.descriptor
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn changes(&self) -> &ChangeTracker {
        &self.changes
    }

    pub fn is_edited(&self) -> bool {
        self.changes.is_edited()
    }

    pub fn change_count(&self) -> u64 {
        self.changes.change_count()
    }

    pub fn undo_log(&self) -> &UndoLog<M> {
        &self.undo
    }

    pub fn controllers(&self) -> &WindowControllerRegistry {
        &self.controllers
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn state(&self) -> LifecycleState {
        if self.closed {
            return LifecycleState::Closed;
        }
        match &self.pending {
            Some(pending) => pending.state(),
            None if self.is_edited() => LifecycleState::Edited,
            None => LifecycleState::Clean,
        }
    }

    /// Name shown in window titles: the file name, or `Untitled` / `Untitled N`.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.file_path.as_deref().and_then(Path::file_name) {
            return name.to_string_lossy().into_owned();
        }
        let base = &self.env.settings.documents.untitled_name;
        if self.untitled_index > 1 {
            format!("{base} {}", self.untitled_index)
        } else {
            base.clone()
        }
    }

    /// Whether the backup of the replaced file is kept on save.
    pub fn keep_backup(&self) -> bool {
        self.model
            .keep_backup_file()
            .unwrap_or(self.env.settings.documents.keep_backup)
    }

    /// Whether `action` can currently be performed.
    ///
    /// Everything is disabled while a prompt is pending or after close.
    pub fn is_action_valid(&self, action: DocumentAction) -> bool {
        if self.closed || self.pending.is_some() {
            return false;
        }
        match action {
            DocumentAction::Save => self.is_edited() || self.file_path.is_none(),
            DocumentAction::SaveAs | DocumentAction::SaveTo | DocumentAction::Close => true,
            DocumentAction::Revert => self.file_path.is_some() && self.is_edited(),
            DocumentAction::Undo => self.undo.can_undo(),
            DocumentAction::Redo => self.undo.can_redo(),
        }
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(DocumentError::DocumentClosed)
        } else {
            Ok(())
        }
    }

    /// Fail unless the document is open with nothing pending.
    pub(crate) fn ensure_idle(&self) -> Result<()> {
        self.ensure_open()?;
        match &self.pending {
            Some(pending) => Err(DocumentError::OperationInFlight {
                pending: pending.label(),
            }),
            None => Ok(()),
        }
    }

    // =========================================================================
    // EDITING
    // =========================================================================

    /// Apply an edit to the model and record it for undo.
    ///
    /// An edit that does not fit the current model is rejected before it
    /// touches the model or the undo log.
    pub fn perform_edit(&mut self, mut edit: impl Edit<M> + 'static) -> Result<()> {
        self.ensure_open()?;
        if !edit.can_apply(&self.model) {
            return Err(DocumentError::EditNotApplicable {
                label: edit.label().to_string(),
            });
        }

        // Recording drops the redo stack, which may hold the saved state.
        if self.changes.is_behind_baseline() {
            self.changes.mark_edited();
        }
        edit.apply(&mut self.model);
        self.undo.record(Box::new(edit));
        self.pump_undo_events();
        Ok(())
    }

    /// Undo the most recent edit. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.closed || !self.undo.undo(&mut self.model) {
            return false;
        }
        self.pump_undo_events();
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.closed || !self.undo.redo(&mut self.model) {
            return false;
        }
        self.pump_undo_events();
        true
    }

    /// Report a change made outside the undo log.
    pub fn update_change_count(&mut self, kind: ChangeKind) {
        self.changes.record_change(kind);
    }

    /// Replace the whole model. Undo history is dropped and the document
    /// stays edited until the next save or revert.
    pub fn replace_model(&mut self, model: M) -> Result<()> {
        self.ensure_open()?;
        self.model = model;
        self.undo.clear();
        self.pump_undo_events();
        self.changes.mark_edited();
        Ok(())
    }

    pub(crate) fn pump_undo_events(&mut self) {
        for event in self.undo_events.try_iter() {
            self.changes.apply_undo_event(event);
        }
    }

    // =========================================================================
    // WINDOW CONTROLLERS
    // =========================================================================

    pub fn add_window_controller(
        &mut self,
        controller: Box<dyn WindowController>,
    ) -> Result<ControllerId> {
        self.ensure_open()?;
        self.controllers.add(controller)
    }

    /// Deliver will-load / load / did-load to controllers added with a
    /// deferred load, in the order they were added.
    pub fn flush_pending_loads(&mut self) {
        while let Some(id) = self.controllers.next_pending_load() {
            let Some(controller) = self.controllers.get_mut(id) else {
                continue;
            };
            self.model.window_controller_will_load(&*controller);
            controller.load();
            self.model.window_controller_did_load(&*controller);
        }
    }

    /// Create the model's controllers if there are none yet, finish their
    /// loading and show them all.
    pub fn show_windows(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.controllers.is_empty() {
            for controller in self.model.make_window_controllers() {
                self.controllers.add(controller)?;
            }
        }
        self.flush_pending_loads();
        self.controllers.show_all();
        Ok(())
    }

    /// Detach a controller.
    ///
    /// When it was the last one and `close_when_last_controller_closes` is
    /// set, the close protocol starts (the user may still be prompted).
    pub fn remove_window_controller(
        &mut self,
        id: ControllerId,
    ) -> Result<Box<dyn WindowController>> {
        self.ensure_open()?;
        let controller = self.controllers.remove(id)?;

        if self.controllers.is_empty()
            && self.env.settings.documents.close_when_last_controller_closes
            && self.pending.is_none()
        {
            tracing::debug!("Last window controller of {} removed", self.display_name());
            self.can_close(|doc, outcome| match outcome {
                Outcome::Completed(()) => {}
                Outcome::Cancelled => {
                    tracing::debug!("{} stays open without windows", doc.display_name());
                }
                Outcome::Failed(err) => {
                    tracing::warn!("Closing {} failed: {err}", doc.display_name());
                }
            })?;
        }
        Ok(controller)
    }

    /// The user closed one controller's window.
    ///
    /// Closing one of several controllers just tears that one down. Closing
    /// the last one, or one that `closes_document()`, runs the close protocol
    /// for the whole document.
    pub fn close_window_controller<F>(&mut self, id: ControllerId, continuation: F) -> Result<()>
    where
        F: FnOnce(&mut Document<M>, Outcome<()>) + 'static,
    {
        self.ensure_idle()?;
        let controller = self
            .controllers
            .get(id)
            .ok_or(DocumentError::UnknownController { id })?;

        if self.controllers.len() == 1 || controller.closes_document() {
            return self.can_close(continuation);
        }

        let mut controller = self.controllers.remove(id)?;
        controller.close();
        continuation(self, Outcome::Completed(()));
        Ok(())
    }
}

fn descriptor_for<M: DocumentModel>(env: &Environment) -> Result<Arc<DocumentTypeDescriptor>> {
    env.registry
        .descriptor(M::CLASS)
        .ok_or_else(|| DocumentError::UnknownDocumentClass {
            class: M::CLASS.to_string(),
        })
        .and_then(|descriptor| {
            if descriptor.types.is_empty() {
                Err(DocumentError::NoDocumentTypes {
                    class: M::CLASS.to_string(),
                })
            } else {
                Ok(descriptor)
            }
        })
}
