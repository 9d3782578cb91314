//! Core client logic for notekeep.
//! This crate owns note validation, the REST repository client and the
//! list/editor controller; UI hosts only render its state.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;
pub mod validation;

pub use config::{ClientConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{NewNote, Note, NoteChanges, NoteId, Priority, UnknownPriority};
pub use repo::error::{ApiError, ApiResult};
pub use repo::http_transport::HttpTransport;
pub use repo::memory_backend::InMemoryBackend;
pub use repo::note_client::NoteClient;
pub use repo::transport::{ApiRequest, ApiResponse, Method, Transport};
pub use service::note_controller::{
    ControllerError, ControllerResult, EditorPhase, EditorState, FormMode, NoteController,
    NoteForm, Notice, SubmitOutcome, LIST_PATH,
};
pub use service::registration::{RegistrationFlow, RegistrationOutcome};
pub use session::{AuthError, AuthProvider, HistoryNavigator, Navigator, Session, SessionUser};
pub use validation::form_state::{FormState, UnknownField};
pub use validation::schema::{
    FieldError, FieldErrorKind, FieldValues, Rule, Schema, ValidationReport,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
