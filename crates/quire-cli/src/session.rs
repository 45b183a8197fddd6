//! Headless document session.
//!
//! Documents opened by the command line have no windows. Prompts they raise
//! are queued by [`HeadlessPresenter`] and answered by [`drive`] with fixed
//! choices: save panels accept the suggested name next to the original,
//! close prompts discard and revert prompts confirm.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, anyhow, bail};
use quire_document::{
    CloseChoice, ClosePromptRequest, Document, DocumentId, DocumentModel, Environment, Outcome,
    Presenter, RevertPromptRequest, SaveTarget, SaveTargetRequest, Settings,
};
use quire_formats::{NotebookDocument, TextDocument};
use quire_model::{DocumentTypeRegistry, TypeRegistry};
use quire_persistence::{FileSystem, StdFileSystem};

/// A prompt raised by a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    SavePanel(SaveTargetRequest),
    Close(ClosePromptRequest),
    Revert(RevertPromptRequest),
}

/// Queues prompts instead of showing them.
#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    prompts: RefCell<VecDeque<Prompt>>,
}

impl HeadlessPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oldest unanswered prompt.
    pub fn next_prompt(&self) -> Option<Prompt> {
        self.prompts.borrow_mut().pop_front()
    }

    pub fn pending(&self) -> usize {
        self.prompts.borrow().len()
    }

    fn push(&self, document: DocumentId, prompt: Prompt) {
        tracing::debug!(%document, ?prompt, "Prompt queued");
        self.prompts.borrow_mut().push_back(prompt);
    }
}

impl Presenter for HeadlessPresenter {
    fn present_save_panel(&self, document: DocumentId, request: SaveTargetRequest) {
        self.push(document, Prompt::SavePanel(request));
    }

    fn present_close_prompt(&self, document: DocumentId, request: ClosePromptRequest) {
        self.push(document, Prompt::Close(request));
    }

    fn present_revert_prompt(&self, document: DocumentId, request: RevertPromptRequest) {
        self.push(document, Prompt::Revert(request));
    }
}

/// The collaborators every command shares.
pub struct Session {
    pub registry: Rc<TypeRegistry>,
    pub presenter: Rc<HeadlessPresenter>,
    env: Environment,
}

impl Session {
    /// A session on the real file system with the bundled document classes.
    pub fn new(settings: Settings) -> Result<Self> {
        Self::with_file_system(Rc::new(StdFileSystem), settings)
    }

    pub fn with_file_system(fs: Rc<dyn FileSystem>, settings: Settings) -> Result<Self> {
        let registry = Rc::new(quire_formats::registry().context("registering document classes")?);
        let presenter = Rc::new(HeadlessPresenter::new());
        let env = Environment::with_settings(
            fs,
            Rc::clone(&registry) as Rc<dyn DocumentTypeRegistry>,
            Rc::clone(&presenter) as Rc<dyn Presenter>,
            settings,
        );
        Ok(Self {
            registry,
            presenter,
            env,
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Open a file as whichever bundled class reads its extension.
    pub fn open(&self, path: &Path) -> Result<OpenDocument> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| anyhow!("{} has no file extension", path.display()))?;
        let (descriptor, _) = self
            .registry
            .type_for_extension(extension)
            .ok_or_else(|| anyhow!("no document class opens .{extension} files"))?;

        let env = self.env.clone();
        let document = match descriptor.class.as_str() {
            TextDocument::CLASS => {
                OpenDocument::Text(Document::open_with_extension(path, env)?)
            }
            NotebookDocument::CLASS => {
                OpenDocument::Notebook(Document::open_with_extension(path, env)?)
            }
            other => bail!("document class {other} is not supported by the command line"),
        };
        Ok(document)
    }
}

/// A document of one of the bundled classes.
pub enum OpenDocument {
    Text(Document<TextDocument>),
    Notebook(Document<NotebookDocument>),
}

/// Run `$body` with `$doc` bound to the inner `Document<M>`.
#[macro_export]
macro_rules! with_document {
    ($open:expr, $doc:ident => $body:expr) => {
        match $open {
            $crate::session::OpenDocument::Text($doc) => $body,
            $crate::session::OpenDocument::Notebook($doc) => $body,
        }
    };
}

impl OpenDocument {
    pub fn class(&self) -> &'static str {
        match self {
            Self::Text(_) => TextDocument::CLASS,
            Self::Notebook(_) => NotebookDocument::CLASS,
        }
    }

    /// Class-specific facts for reports.
    pub fn details(&self) -> Vec<(String, String)> {
        match self {
            Self::Text(doc) => {
                let model = doc.model();
                vec![
                    ("Lines".into(), model.line_count().to_string()),
                    ("Characters".into(), model.text.chars().count().to_string()),
                ]
            }
            Self::Notebook(doc) => {
                let model = doc.model();
                vec![
                    ("Title".into(), model.title.clone()),
                    ("Notes".into(), model.notes.len().to_string()),
                ]
            }
        }
    }
}

/// Start an operation and answer its prompts until it completes.
///
/// `start` receives the document and a continuation to hand to the
/// operation.
pub fn drive<M, T>(
    doc: &mut Document<M>,
    presenter: &HeadlessPresenter,
    start: impl FnOnce(
        &mut Document<M>,
        Box<dyn FnOnce(&mut Document<M>, Outcome<T>)>,
    ) -> quire_document::Result<()>,
) -> Result<Outcome<T>>
where
    M: DocumentModel,
    T: 'static,
{
    let slot: Rc<RefCell<Option<Outcome<T>>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&slot);
    start(
        doc,
        Box::new(move |_: &mut Document<M>, outcome: Outcome<T>| {
            *sink.borrow_mut() = Some(outcome);
        }),
    )?;

    loop {
        if let Some(outcome) = slot.borrow_mut().take() {
            return Ok(outcome);
        }
        match presenter.next_prompt() {
            Some(Prompt::SavePanel(request)) => {
                let target = headless_target(doc, &request);
                tracing::info!(path = %target.path.display(), "Saving to suggested location");
                doc.resume_save_panel(Some(target))?;
            }
            Some(Prompt::Close(_)) => doc.resume_close_prompt(CloseChoice::Discard)?,
            Some(Prompt::Revert(_)) => doc.resume_revert_prompt(true)?,
            None => bail!("{} is waiting for an answer that never came", doc.display_name()),
        }
    }
}

fn headless_target<M: DocumentModel>(doc: &Document<M>, request: &SaveTargetRequest) -> SaveTarget {
    let directory = request
        .directory
        .clone()
        .or_else(|| doc.file_path().and_then(Path::parent).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    SaveTarget::new(directory.join(&request.suggested_name), &request.default_type)
}
