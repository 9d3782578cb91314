//! Note list / editor controller.
//!
//! # Responsibility
//! - Fetch the note list on load and after every successful mutation.
//! - Own the transient edit session (`EditorState`) and its form.
//! - Turn every failure into a page-level `Notice` or field errors.
//!   Backend validation messages that name a form field are also shown on
//!   that field.
//!
//! # Invariants
//! - The cached list is a read cache: it is marked stale after each successful
//!   create/update/delete and refetched in full, never patched locally.
//! - A form whose report has errors never reaches the repository client.
//! - At most one request is in flight; overlapping intents fail with `Busy`.
//! - After a failed submit the form is reopened, except `NotFound` while
//!   editing, which returns to `Idle`.

use crate::model::note::{NewNote, Note, NoteChanges, NoteId};
use crate::repo::error::ApiError;
use crate::repo::note_client::NoteClient;
use crate::repo::transport::Transport;
use crate::session::Navigator;
use crate::validation::form_state::{FormState, UnknownField};
use crate::validation::forms::{
    note_form_defaults, note_form_schema, note_form_values, NoteFormFields,
};
use crate::validation::schema::ValidationReport;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Route shown after a successful mutation.
pub const LIST_PATH: &str = "/";

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Controller-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Repository client failure (also surfaced as a notice).
    Api(ApiError),
    /// A request is already in flight.
    Busy,
    /// The intent needs an open create/edit form.
    NoActiveForm,
    /// The intent needs the editor to be idle.
    FormOpen,
    /// The form has no such field.
    UnknownField(UnknownField),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api(err) => write!(f, "{err}"),
            Self::Busy => write!(f, "a request is already in flight"),
            Self::NoActiveForm => write!(f, "no note form is open"),
            Self::FormOpen => write!(f, "close the open note form first"),
            Self::UnknownField(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::UnknownField(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for ControllerError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<UnknownField> for ControllerError {
    fn from(value: UnknownField) -> Self {
        Self::UnknownField(value)
    }
}

/// Page-level message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Backend unreachable or failed unexpectedly.
    Failure(String),
    /// The addressed note no longer exists.
    NoteGone(NoteId),
    /// The backend rejected the submitted values.
    Rejected(Vec<String>),
    Saved(NoteId),
    Deleted(NoteId),
}

impl Notice {
    fn from_api_error(err: &ApiError) -> Self {
        match err {
            ApiError::Validation(messages) => Self::Rejected(messages.clone()),
            other => Self::Failure(other.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Saved(_) | Self::Deleted(_))
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failure(message) => write!(f, "Something went wrong: {message}"),
            Self::NoteGone(id) => write!(f, "Note {id} no longer exists"),
            Self::Rejected(messages) if messages.is_empty() => {
                write!(f, "The note was rejected by the server")
            }
            Self::Rejected(messages) => {
                write!(f, "The note was rejected: {}", messages.join("; "))
            }
            Self::Saved(id) => write!(f, "Note {id} saved"),
            Self::Deleted(id) => write!(f, "Note {id} deleted"),
        }
    }
}

/// What an open note form will do on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Holds the note as loaded when editing started.
    Edit(Note),
}

/// Note form plus its mode.
#[derive(Debug, Clone)]
pub struct NoteForm {
    mode: FormMode,
    form: FormState,
}

impl NoteForm {
    fn create() -> Self {
        Self {
            mode: FormMode::Create,
            form: FormState::new(note_form_schema(), note_form_defaults()),
        }
    }

    fn edit(note: Note) -> Self {
        let values = note_form_values(&note);
        Self {
            mode: FormMode::Edit(note),
            form: FormState::new(note_form_schema(), values),
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Id of the note being edited; `None` for the create form.
    pub fn editing_id(&self) -> Option<&NoteId> {
        match &self.mode {
            FormMode::Create => None,
            FormMode::Edit(note) => Some(&note.id),
        }
    }

    fn into_open_state(self) -> EditorState {
        match self.mode {
            FormMode::Create => EditorState::Creating(self),
            FormMode::Edit(_) => EditorState::Editing(self),
        }
    }
}

/// Edit-session state machine.
#[derive(Debug, Clone)]
pub enum EditorState {
    Idle,
    LoadingNote(NoteId),
    Creating(NoteForm),
    Editing(NoteForm),
    Submitting(NoteForm),
    Deleting(NoteId),
}

/// Data-free view of [`EditorState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Idle,
    LoadingNote,
    Creating,
    Editing,
    Submitting,
    Deleting,
}

impl EditorState {
    pub fn phase(&self) -> EditorPhase {
        match self {
            Self::Idle => EditorPhase::Idle,
            Self::LoadingNote(_) => EditorPhase::LoadingNote,
            Self::Creating(_) => EditorPhase::Creating,
            Self::Editing(_) => EditorPhase::Editing,
            Self::Submitting(_) => EditorPhase::Submitting,
            Self::Deleting(_) => EditorPhase::Deleting,
        }
    }

    /// Whether a request is in flight (submit affordance disabled).
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::LoadingNote(_) | Self::Submitting(_) | Self::Deleting(_)
        )
    }
}

/// Result of a submit attempt that did not fail at the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Stored representation echoed by the backend.
    Saved(Note),
    /// Blocked locally; nothing was sent.
    Invalid(ValidationReport),
}

#[derive(Debug)]
struct NoteListCache {
    notes: Vec<Note>,
    stale: bool,
}

/// Orchestrates list fetches, the edit session and mutations.
pub struct NoteController<T: Transport, N: Navigator> {
    client: NoteClient<T>,
    navigator: N,
    list: NoteListCache,
    state: EditorState,
    notice: Option<Notice>,
}

impl<T: Transport, N: Navigator> NoteController<T, N> {
    /// Creates an idle controller with an empty, stale list.
    pub fn new(client: NoteClient<T>, navigator: N) -> Self {
        Self {
            client,
            navigator,
            list: NoteListCache {
                notes: Vec::new(),
                stale: true,
            },
            state: EditorState::Idle,
            notice: None,
        }
    }

    pub fn client(&self) -> &NoteClient<T> {
        &self.client
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Cached list from the last successful fetch.
    pub fn notes(&self) -> &[Note] {
        &self.list.notes
    }

    pub fn is_list_stale(&self) -> bool {
        self.list.stale
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn phase(&self) -> EditorPhase {
        self.state.phase()
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Open create/edit form, also while it is being submitted.
    pub fn active_form(&self) -> Option<&NoteForm> {
        match &self.state {
            EditorState::Creating(form)
            | EditorState::Editing(form)
            | EditorState::Submitting(form) => Some(form),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Returns and clears the current notice.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Fetches the full list and replaces the cache.
    pub async fn load_notes(&mut self) -> ControllerResult<&[Note]> {
        match self.client.list_notes().await {
            Ok(notes) => {
                info!(
                    "event=notes_loaded module=service status=ok count={}",
                    notes.len()
                );
                self.list.notes = notes;
                self.list.stale = false;
                Ok(&self.list.notes)
            }
            Err(err) => {
                warn!("event=notes_loaded module=service status=error error={err}");
                self.notice = Some(Notice::from_api_error(&err));
                Err(err.into())
            }
        }
    }

    /// Refetches only when a mutation invalidated the cache.
    pub async fn refresh_if_stale(&mut self) -> ControllerResult<()> {
        if self.list.stale {
            self.load_notes().await?;
        }
        Ok(())
    }

    /// Opens an empty create form.
    pub fn begin_create(&mut self) -> ControllerResult<()> {
        self.ensure_not_busy()?;
        self.state = EditorState::Creating(NoteForm::create());
        Ok(())
    }

    /// Loads note `id` and opens the edit form pre-populated with it.
    ///
    /// On `NotFound` the editor stays idle, a `NoteGone` notice is set and the
    /// list is refetched.
    pub async fn begin_edit(&mut self, id: &NoteId) -> ControllerResult<()> {
        self.ensure_not_busy()?;
        self.state = EditorState::LoadingNote(id.clone());

        match self.client.get_note(id).await {
            Ok(note) => {
                debug!("event=note_edit_opened module=service status=ok note_id={id}");
                self.state = EditorState::Editing(NoteForm::edit(note));
                Ok(())
            }
            Err(err) => {
                self.state = EditorState::Idle;
                if err.is_not_found() {
                    self.notice = Some(Notice::NoteGone(id.clone()));
                    self.invalidate_and_reload().await;
                } else {
                    self.notice = Some(Notice::from_api_error(&err));
                }
                Err(err.into())
            }
        }
    }

    /// Updates one field of the open form and returns the fresh report.
    pub fn set_field(
        &mut self,
        field: &str,
        value: impl Into<String>,
    ) -> ControllerResult<&ValidationReport> {
        match &mut self.state {
            EditorState::Creating(note_form) | EditorState::Editing(note_form) => {
                Ok(note_form.form.set_field(field, value)?)
            }
            state if state.is_busy() => Err(ControllerError::Busy),
            _ => Err(ControllerError::NoActiveForm),
        }
    }

    /// Validates the open form and, when clean, sends it.
    ///
    /// Returns `Invalid` without any request when validation fails. On a
    /// repository failure the error is returned, a notice is set and the form
    /// is reopened (or closed for `NotFound` while editing).
    pub async fn submit(&mut self) -> ControllerResult<SubmitOutcome> {
        let mut note_form = match std::mem::replace(&mut self.state, EditorState::Idle) {
            EditorState::Creating(note_form) | EditorState::Editing(note_form) => note_form,
            other => {
                let err = if other.is_busy() {
                    ControllerError::Busy
                } else {
                    ControllerError::NoActiveForm
                };
                self.state = other;
                return Err(err);
            }
        };

        let fields = match note_form.form.try_submit() {
            Ok(values) => NoteFormFields::from_values(&values),
            Err(report) => {
                debug!(
                    "event=note_submit module=service status=blocked invalid_fields={}",
                    report.invalid_fields().join(",")
                );
                self.state = note_form.into_open_state();
                return Ok(SubmitOutcome::Invalid(report));
            }
        };
        let Some(fields) = fields else {
            let report = note_form.form.report().clone();
            self.state = note_form.into_open_state();
            return Ok(SubmitOutcome::Invalid(report));
        };

        let mode = note_form.mode.clone();
        self.state = EditorState::Submitting(note_form.clone());
        let result = match &mode {
            FormMode::Create => {
                let new_note = NewNote::generated(fields.title, fields.priority, fields.description);
                self.client.create_note(&new_note).await
            }
            FormMode::Edit(original) => {
                let changes = NoteChanges {
                    title: fields.title,
                    priority: fields.priority,
                    description: fields.description,
                    created_at: Some(original.created_at),
                };
                self.client.update_note(&original.id, &changes).await
            }
        };

        match result {
            Ok(note) => {
                info!(
                    "event=note_saved module=service status=ok note_id={} mode={}",
                    note.id,
                    mode_name(&mode)
                );
                self.state = EditorState::Idle;
                self.notice = Some(Notice::Saved(note.id.clone()));
                self.after_mutation().await;
                Ok(SubmitOutcome::Saved(note))
            }
            Err(err) => {
                warn!(
                    "event=note_saved module=service status=error mode={} error={}",
                    mode_name(&mode),
                    err
                );
                match (&mode, err.is_not_found()) {
                    (FormMode::Edit(original), true) => {
                        self.state = EditorState::Idle;
                        self.notice = Some(Notice::NoteGone(original.id.clone()));
                        self.invalidate_and_reload().await;
                    }
                    _ => {
                        self.notice = Some(Notice::from_api_error(&err));
                        if let ApiError::Validation(messages) = &err {
                            note_form.form.attach_rejections(messages);
                        }
                        self.state = note_form.into_open_state();
                    }
                }
                Err(err.into())
            }
        }
    }

    /// Deletes note `id`. Only allowed while idle.
    ///
    /// On failure the editor returns to idle with a notice and the cached list
    /// is left as is, except `NotFound`, which triggers a refetch.
    pub async fn delete(&mut self, id: &NoteId) -> ControllerResult<()> {
        match &self.state {
            EditorState::Idle => {}
            state if state.is_busy() => return Err(ControllerError::Busy),
            _ => return Err(ControllerError::FormOpen),
        }

        self.state = EditorState::Deleting(id.clone());
        let result = self.client.delete_note(id).await;
        self.state = EditorState::Idle;

        match result {
            Ok(()) => {
                info!("event=note_deleted module=service status=ok note_id={id}");
                self.notice = Some(Notice::Deleted(id.clone()));
                self.after_mutation().await;
                Ok(())
            }
            Err(err) => {
                warn!("event=note_deleted module=service status=error note_id={id} error={err}");
                if err.is_not_found() {
                    self.notice = Some(Notice::NoteGone(id.clone()));
                    self.invalidate_and_reload().await;
                } else {
                    self.notice = Some(Notice::from_api_error(&err));
                }
                Err(err.into())
            }
        }
    }

    /// Leaves any form or pending intent and returns to idle.
    pub fn cancel(&mut self) {
        if !matches!(self.state, EditorState::Idle) {
            debug!(
                "event=editor_cancel module=service status=ok phase={:?}",
                self.state.phase()
            );
        }
        self.state = EditorState::Idle;
    }

    fn ensure_not_busy(&self) -> ControllerResult<()> {
        if self.state.is_busy() {
            return Err(ControllerError::Busy);
        }
        Ok(())
    }

    async fn after_mutation(&mut self) {
        self.invalidate_and_reload().await;
        self.navigator.navigate_to(LIST_PATH);
    }

    /// Marks the cache stale and refetches. A failed refetch leaves the cache
    /// stale and replaces the notice with the failure.
    async fn invalidate_and_reload(&mut self) {
        self.list.stale = true;
        if let Err(err) = self.load_notes().await {
            warn!("event=notes_refresh module=service status=error error={err}");
        }
    }
}

fn mode_name(mode: &FormMode) -> &'static str {
    match mode {
        FormMode::Create => "create",
        FormMode::Edit(_) => "edit",
    }
}
