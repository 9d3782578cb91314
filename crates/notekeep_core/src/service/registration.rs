//! Sign-up flow over an external auth provider.
//!
//! # Invariants
//! - An authenticated session redirects to the list route and never shows
//!   the form.
//! - Invalid values never reach the auth provider.
//! - Provider errors keep the form open.

use crate::service::note_controller::{ControllerError, ControllerResult, LIST_PATH};
use crate::session::{AuthError, AuthProvider, Navigator, Session};
use crate::validation::form_state::FormState;
use crate::validation::forms::{
    register_form_defaults, register_form_schema, EMAIL, NAME, PASSWORD,
};
use crate::validation::schema::ValidationReport;
use log::{info, warn};

/// Result of a registration submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Signed up and redirected.
    Registered,
    /// Blocked locally; provider not called.
    Invalid(ValidationReport),
    /// Provider refused the sign-up.
    Failed(AuthError),
    /// Session already authenticated; redirected without submitting.
    AlreadySignedIn,
}

pub struct RegistrationFlow<A: AuthProvider, N: Navigator> {
    auth: A,
    navigator: N,
    session: Session,
    form: FormState,
    pending: bool,
    error: Option<AuthError>,
}

impl<A: AuthProvider, N: Navigator> RegistrationFlow<A, N> {
    /// Opens the flow; redirects immediately when `session` is authenticated.
    pub fn new(auth: A, navigator: N, session: Session) -> Self {
        let flow = Self {
            auth,
            navigator,
            session,
            form: FormState::new(register_form_schema(), register_form_defaults()),
            pending: false,
            error: None,
        };
        flow.redirect_if_authenticated();
        flow
    }

    /// Replaces the session snapshot, redirecting when it became authenticated.
    pub fn on_session_change(&mut self, session: Session) {
        let was_authenticated = self.session.is_authenticated();
        self.session = session;
        if !was_authenticated {
            self.redirect_if_authenticated();
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Last provider error, cleared on the next submit.
    pub fn error(&self) -> Option<&AuthError> {
        self.error.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn set_field(
        &mut self,
        field: &str,
        value: impl Into<String>,
    ) -> ControllerResult<&ValidationReport> {
        Ok(self.form.set_field(field, value)?)
    }

    pub async fn submit(&mut self) -> ControllerResult<RegistrationOutcome> {
        if self.pending {
            return Err(ControllerError::Busy);
        }
        if self.session.is_authenticated() {
            self.navigator.navigate_to(LIST_PATH);
            return Ok(RegistrationOutcome::AlreadySignedIn);
        }

        let values = match self.form.try_submit() {
            Ok(values) => values,
            Err(report) => return Ok(RegistrationOutcome::Invalid(report)),
        };
        let field = |name: &str| values.get(name).map(String::as_str).unwrap_or_default();

        self.pending = true;
        self.error = None;
        let result = self
            .auth
            .sign_up(field(NAME), field(EMAIL), field(PASSWORD))
            .await;
        self.pending = false;

        match result {
            Ok(()) => {
                info!("event=sign_up module=service status=ok");
                self.navigator.navigate_to(LIST_PATH);
                Ok(RegistrationOutcome::Registered)
            }
            Err(err) => {
                warn!("event=sign_up module=service status=error error={err}");
                self.error = Some(err.clone());
                Ok(RegistrationOutcome::Failed(err))
            }
        }
    }

    fn redirect_if_authenticated(&self) {
        if self.session.is_authenticated() {
            self.navigator.navigate_to(LIST_PATH);
        }
    }
}
