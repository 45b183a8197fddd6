//! Save / close / revert state machine.
//!
//! Every operation that may need the user parks a continuation in
//! [`Pending`] and returns. The matching `resume_*` call takes it back out
//! and finishes the operation. Immediate rejections (a closed document,
//! another operation in flight) are returned as `Err` and the continuation
//! is dropped without being called.

use std::path::{Path, PathBuf};

use quire_model::{ChangeKind, DocumentType, SaveKind, SaveOperation};
use quire_persistence::{BackupPolicy, PersistenceError, decode, encode, read_representation};

use crate::document::{Document, DocumentModel, LifecycleState};
use crate::error::{DocumentError, Outcome, Result, SaveOutcome, SavedDocument};
use crate::presenter::{
    CloseChoice, ClosePromptRequest, RevertPromptRequest, SaveTarget, SaveTargetRequest,
};

pub type SaveContinuation<M> = Box<dyn FnOnce(&mut Document<M>, SaveOutcome)>;
pub type CloseContinuation<M> = Box<dyn FnOnce(&mut Document<M>, Outcome<()>)>;
pub type RevertContinuation<M> = Box<dyn FnOnce(&mut Document<M>, Outcome<()>)>;

/// An operation waiting for the user.
pub(crate) enum Pending<M: DocumentModel> {
    SaveTarget {
        kind: SaveKind,
        /// The save was requested by the close prompt.
        closing: bool,
        continuation: SaveContinuation<M>,
    },
    CloseDecision {
        continuation: CloseContinuation<M>,
    },
    RevertConfirmation {
        continuation: RevertContinuation<M>,
    },
}

impl<M: DocumentModel> Pending<M> {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::SaveTarget { closing: false, .. } => "save",
            Self::SaveTarget { closing: true, .. } | Self::CloseDecision { .. } => "close",
            Self::RevertConfirmation { .. } => "revert",
        }
    }

    pub(crate) fn state(&self) -> LifecycleState {
        match self {
            Self::SaveTarget { closing: false, .. } => LifecycleState::SavePending,
            Self::SaveTarget { closing: true, .. } | Self::CloseDecision { .. } => {
                LifecycleState::ClosePending
            }
            Self::RevertConfirmation { .. } => LifecycleState::RevertPending,
        }
    }
}

impl<M: DocumentModel> Document<M> {
    // =========================================================================
    // SAVE
    // =========================================================================

    /// Save the document.
    ///
    /// `Save` on a document with a file and a writable type writes straight
    /// away. Otherwise (`SaveAs`, `SaveTo`, or `Save` of an untitled or
    /// imported document) the save panel is presented and the save resumes
    /// in [`Document::resume_save_panel`].
    pub fn save<F>(&mut self, kind: SaveKind, continuation: F) -> Result<()>
    where
        F: FnOnce(&mut Document<M>, SaveOutcome) + 'static,
    {
        self.ensure_idle()?;
        self.begin_save(kind, false, Box::new(continuation));
        Ok(())
    }

    /// Save to a known location without asking the user.
    pub fn save_to_path<F>(
        &mut self,
        kind: SaveKind,
        path: impl Into<PathBuf>,
        type_tag: &str,
        continuation: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Document<M>, SaveOutcome) + 'static,
    {
        self.ensure_idle()?;
        let outcome = self.save_to_target(kind, SaveTarget::new(path, type_tag));
        continuation(self, outcome.into());
        Ok(())
    }

    /// Deliver the save panel's answer; `None` means the user cancelled.
    pub fn resume_save_panel(&mut self, target: Option<SaveTarget>) -> Result<()> {
        let (kind, continuation) = match self.pending.take() {
            Some(Pending::SaveTarget {
                kind, continuation, ..
            }) => (kind, continuation),
            other => {
                self.pending = other;
                return Err(DocumentError::UnexpectedResponse {
                    expected: "save panel",
                });
            }
        };

        let Some(target) = target else {
            tracing::debug!("{} of {} cancelled", kind.label(), self.display_name());
            continuation(self, Outcome::Cancelled);
            return Ok(());
        };

        let outcome = self.save_to_target(kind, target);
        continuation(self, outcome.into());
        Ok(())
    }

    pub(crate) fn begin_save(
        &mut self,
        kind: SaveKind,
        closing: bool,
        continuation: SaveContinuation<M>,
    ) {
        if kind == SaveKind::Save
            && let Some(path) = self.file_path.clone()
            && self.descriptor.is_writable(&self.type_tag)
            && self.descriptor.is_readable(&self.type_tag)
        {
            let operation = SaveOperation::new(kind, path.clone(), self.type_tag.clone(), Some(path));
            let outcome = self.perform_save(&operation);
            continuation(self, outcome.into());
            return;
        }

        let kind = match kind {
            SaveKind::Save => SaveKind::SaveAs,
            other => other,
        };

        let request = match self.save_panel_request(kind) {
            Ok(request) => request,
            Err(err) => {
                continuation(self, Outcome::Failed(err));
                return;
            }
        };

        tracing::debug!("{} of {} waiting for a location", kind.label(), self.display_name());
        self.pending = Some(Pending::SaveTarget {
            kind,
            closing,
            continuation,
        });
        self.env.presenter.present_save_panel(self.id, request);
    }

    fn save_panel_request(&self, kind: SaveKind) -> Result<SaveTargetRequest> {
        let allowed_types: Vec<DocumentType> =
            self.descriptor.types_for_save(kind).into_iter().cloned().collect();

        let default_type = allowed_types
            .iter()
            .find(|ty| ty.tag == self.type_tag)
            .or_else(|| allowed_types.first())
            .ok_or_else(|| {
                PersistenceError::unsupported(
                    &self.type_tag,
                    self.descriptor
                        .default_type()
                        .map(|ty| ty.form)
                        .unwrap_or_default(),
                    "written",
                )
            })?;

        let stem = self
            .file_path
            .as_deref()
            .and_then(Path::file_stem)
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.display_name());
        let suggested_name = match default_type.primary_extension() {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        };
        let default_type = default_type.tag.clone();

        Ok(SaveTargetRequest {
            kind,
            suggested_name,
            directory: self
                .file_path
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf),
            default_type,
            allowed_types,
        })
    }

    fn save_to_target(&mut self, kind: SaveKind, target: SaveTarget) -> Result<SavedDocument> {
        let ty = self
            .descriptor
            .types_for_save(kind)
            .into_iter()
            .find(|ty| ty.tag == target.type_tag)
            .ok_or_else(|| DocumentError::TypeNotAllowed {
                type_tag: target.type_tag.clone(),
                kind,
            })?;

        // Ensure the file has the type's extension
        let mut path = target.path;
        if path.extension().is_none()
            && let Some(ext) = ty.primary_extension()
        {
            path.set_extension(ext);
        }

        let operation = SaveOperation::new(kind, path, target.type_tag, self.file_path.clone());
        self.perform_save(&operation)
    }

    fn perform_save(&mut self, operation: &SaveOperation) -> Result<SavedDocument> {
        let result = self.write_operation(operation);
        match &result {
            Ok(saved) => tracing::info!(
                "{} {} to {} as {}",
                operation.kind.label(),
                self.display_name(),
                saved.path.display(),
                saved.type_tag
            ),
            Err(err) => tracing::warn!(
                "{} to {} failed: {err}",
                operation.kind.label(),
                operation.target_path.display()
            ),
        }
        result
    }

    fn write_operation(&mut self, operation: &SaveOperation) -> Result<SavedDocument> {
        let representation = encode(&self.model, &self.descriptor, &operation.type_tag)?;

        // Only the document's own file is backed up; other files it lands on are replaced.
        let policy = if operation.kind.updates_identity()
            && operation.overwrites_original()
            && self.keep_backup()
        {
            BackupPolicy::keep()
        } else {
            BackupPolicy::discard()
        };
        let report = self
            .env
            .writer()
            .write(&representation, &operation.target_path, policy)?;

        if operation.kind.updates_identity() {
            self.file_path = Some(operation.target_path.clone());
            self.type_tag = operation.type_tag.clone();
            self.untitled_index = 0;
            self.changes.record_change(ChangeKind::ClearedAtSave);
        }

        Ok(SavedDocument {
            kind: operation.kind,
            path: report.target_path,
            type_tag: operation.type_tag.clone(),
            backup_path: report.backup_path,
        })
    }

    // =========================================================================
    // CLOSE
    // =========================================================================

    /// Run the close protocol.
    ///
    /// An edited document first asks the user whether to save; the answer
    /// arrives through [`Document::resume_close_prompt`]. Then every window
    /// controller is asked in order whether it may close, and the first veto
    /// fails the close with nothing torn down.
    pub fn can_close<F>(&mut self, continuation: F) -> Result<()>
    where
        F: FnOnce(&mut Document<M>, Outcome<()>) + 'static,
    {
        self.ensure_idle()?;
        let continuation: CloseContinuation<M> = Box::new(continuation);

        if !self.is_edited() {
            self.finish_close(continuation);
            return Ok(());
        }

        let request = ClosePromptRequest {
            display_name: self.display_name(),
            file_path: self.file_path.clone(),
        };
        tracing::debug!("Asking whether to save {} before closing", request.display_name);
        self.pending = Some(Pending::CloseDecision { continuation });
        self.env.presenter.present_close_prompt(self.id, request);
        Ok(())
    }

    /// Deliver the close prompt's answer.
    pub fn resume_close_prompt(&mut self, choice: CloseChoice) -> Result<()> {
        let continuation = match self.pending.take() {
            Some(Pending::CloseDecision { continuation }) => continuation,
            other => {
                self.pending = other;
                return Err(DocumentError::UnexpectedResponse {
                    expected: "close prompt",
                });
            }
        };

        match choice {
            CloseChoice::Cancel => continuation(self, Outcome::Cancelled),
            CloseChoice::Discard => self.finish_close(continuation),
            CloseChoice::Save => self.begin_save(
                SaveKind::Save,
                true,
                Box::new(move |doc: &mut Document<M>, outcome: SaveOutcome| match outcome {
                    Outcome::Completed(_) => doc.finish_close(continuation),
                    Outcome::Cancelled => continuation(doc, Outcome::Cancelled),
                    Outcome::Failed(err) => continuation(doc, Outcome::Failed(err)),
                }),
            ),
        }
        Ok(())
    }

    fn finish_close(&mut self, continuation: CloseContinuation<M>) {
        if let Some(controller) = self.controllers.first_veto() {
            tracing::debug!("Window controller {controller} kept {} open", self.display_name());
            continuation(self, Outcome::Failed(DocumentError::CloseVetoed { controller }));
            return;
        }
        self.close();
        continuation(self, Outcome::Completed(()));
    }

    /// Tear the document down without asking anyone.
    ///
    /// Controllers are closed in order, undo history is dropped and the
    /// presenter is told the document is gone. A pending operation is
    /// abandoned without calling its continuation.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.pending = None;
        self.controllers.tear_down();
        self.undo.clear();
        self.pump_undo_events();
        self.closed = true;

        tracing::info!("Closed {}", self.display_name());
        self.env.presenter.document_did_close(self.id);
    }

    // =========================================================================
    // REVERT
    // =========================================================================

    /// Replace the model with the contents of the document's file.
    ///
    /// On failure the model, change count and undo history are untouched.
    pub fn revert(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.revert_from_disk()
    }

    /// Ask the user to confirm, then revert.
    pub fn revert_to_saved<F>(&mut self, continuation: F) -> Result<()>
    where
        F: FnOnce(&mut Document<M>, Outcome<()>) + 'static,
    {
        self.ensure_idle()?;
        let file_path = self.file_path.clone().ok_or(DocumentError::NoBackingFile)?;

        let request = RevertPromptRequest {
            display_name: self.display_name(),
            file_path,
        };
        self.pending = Some(Pending::RevertConfirmation {
            continuation: Box::new(continuation),
        });
        self.env.presenter.present_revert_prompt(self.id, request);
        Ok(())
    }

    /// Deliver the revert prompt's answer.
    pub fn resume_revert_prompt(&mut self, confirmed: bool) -> Result<()> {
        let continuation = match self.pending.take() {
            Some(Pending::RevertConfirmation { continuation }) => continuation,
            other => {
                self.pending = other;
                return Err(DocumentError::UnexpectedResponse {
                    expected: "revert prompt",
                });
            }
        };

        if !confirmed {
            continuation(self, Outcome::Cancelled);
            return Ok(());
        }
        let outcome: Outcome<()> = self.revert_from_disk().into();
        continuation(self, outcome);
        Ok(())
    }

    fn revert_from_disk(&mut self) -> Result<()> {
        let path = self.file_path.clone().ok_or(DocumentError::NoBackingFile)?;
        let form = self
            .document_type()
            .map(|ty| ty.form)
            .unwrap_or_default();

        let loaded = read_representation(self.env.fs.as_ref(), &path, form).and_then(
            |representation| {
                decode::<M>(&representation, &self.descriptor, &self.type_tag)
                    .map_err(|e| e.with_path(&path))
            },
        );
        let model = match loaded {
            Ok(model) => model,
            Err(err) => {
                tracing::warn!("Revert of {} failed: {err}", path.display());
                return Err(err.into());
            }
        };

        self.model = model;
        self.undo.clear();
        self.pump_undo_events();
        self.changes.record_change(ChangeKind::ClearedAtSave);

        tracing::info!("Reverted {} to {}", self.display_name(), path.display());
        Ok(())
    }
}
