//! The abstract document core.
//!
//! A [`Document`] is a unit of user work, optionally backed by a file. It owns
//! its model, a [`ChangeTracker`] fed by an [`UndoLog`], and the
//! [`WindowControllerRegistry`] of surfaces presenting it, and it drives the
//! save / revert / close lifecycle.
//!
//! # Continuations
//!
//! Nothing here blocks waiting for the user. Operations that need an answer
//! (a save location, "save changes before closing?") hand a request to the
//! [`Presenter`], park the caller's continuation inside the document and
//! return. The application later feeds the answer back through
//! [`Document::resume_save_panel`], [`Document::resume_close_prompt`] or
//! [`Document::resume_revert_prompt`], and the continuation fires with an
//! [`Outcome`]. Only one such operation may be in flight per document.
//!
//! # Architecture
//!
//! - `document.rs` - The document aggregate, edits, controllers, validation
//! - `lifecycle.rs` - Save / close / revert state machine
//! - `change.rs` - Edited-state tracking relative to the saved baseline
//! - `undo.rs` - Undo/redo log and its change-event stream
//! - `controller.rs` - Window controller trait and registry
//! - `presenter.rs` - Prompt requests and responses
//! - `environment.rs` - Collaborators shared by documents
//! - `settings.rs` - User preferences persisted as TOML
//! - `error.rs` - Error and outcome types

mod change;
mod controller;
mod document;
mod environment;
mod error;
mod lifecycle;
mod presenter;
mod settings;
mod undo;

pub use change::ChangeTracker;
pub use controller::{ControllerId, WindowController, WindowControllerRegistry};
pub use document::{Document, DocumentAction, DocumentId, DocumentModel, LifecycleState};
pub use environment::{Environment, UntitledCounter};
pub use error::{DocumentError, Outcome, Result, SaveOutcome, SavedDocument};
pub use lifecycle::{CloseContinuation, RevertContinuation, SaveContinuation};
pub use presenter::{
    CloseChoice, ClosePromptRequest, Presenter, RevertPromptRequest, SaveTarget,
    SaveTargetRequest,
};
pub use settings::{DocumentSettings, PersistenceSettings, Settings, SettingsError};
pub use undo::{Edit, UndoEvent, UndoLog};
