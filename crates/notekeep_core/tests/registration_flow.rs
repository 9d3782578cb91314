use async_trait::async_trait;
use notekeep_core::validation::forms::{CONFIRM_PASSWORD, EMAIL, NAME, PASSWORD};
use notekeep_core::{
    AuthError, AuthProvider, HistoryNavigator, RegistrationFlow, RegistrationOutcome, Session,
    SessionUser, LIST_PATH,
};
use std::sync::Mutex;

#[derive(Default)]
struct FakeAuth {
    calls: Mutex<Vec<(String, String, String)>>,
    failure: Option<String>,
}

impl FakeAuth {
    fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError> {
        self.calls.lock().unwrap().push((
            name.to_string(),
            email.to_string(),
            password.to_string(),
        ));
        match &self.failure {
            Some(message) => Err(AuthError::new(message.clone())),
            None => Ok(()),
        }
    }
}

fn fill(flow: &mut RegistrationFlow<&FakeAuth, &HistoryNavigator>, confirm: &str) {
    flow.set_field(NAME, "Ada").unwrap();
    flow.set_field(EMAIL, "ada@example.com").unwrap();
    flow.set_field(PASSWORD, "secret1").unwrap();
    flow.set_field(CONFIRM_PASSWORD, confirm).unwrap();
}

fn signed_in() -> Session {
    Session::authenticated(SessionUser {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    })
}

#[tokio::test]
async fn valid_sign_up_calls_provider_and_redirects() {
    let auth = FakeAuth::default();
    let navigator = HistoryNavigator::new();
    let mut flow = RegistrationFlow::new(&auth, &navigator, Session::anonymous());
    assert!(navigator.history().is_empty());

    fill(&mut flow, "secret1");
    let outcome = flow.submit().await.unwrap();

    assert_eq!(outcome, RegistrationOutcome::Registered);
    assert_eq!(
        auth.calls(),
        vec![(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "secret1".to_string()
        )]
    );
    assert_eq!(navigator.current().as_deref(), Some(LIST_PATH));
    assert!(!flow.is_pending());
}

#[tokio::test]
async fn mismatched_confirmation_blocks_submit() {
    let auth = FakeAuth::default();
    let navigator = HistoryNavigator::new();
    let mut flow = RegistrationFlow::new(&auth, &navigator, Session::anonymous());

    fill(&mut flow, "secret2");
    let outcome = flow.submit().await.unwrap();

    let RegistrationOutcome::Invalid(report) = &outcome else {
        panic!("expected invalid outcome, got {outcome:?}");
    };
    assert_eq!(
        report.messages_for(CONFIRM_PASSWORD),
        vec!["Passwords do not match"]
    );
    assert!(auth.calls().is_empty());
    assert!(navigator.history().is_empty());
}

#[tokio::test]
async fn provider_error_keeps_the_form_open() {
    let auth = FakeAuth::failing("email already registered");
    let navigator = HistoryNavigator::new();
    let mut flow = RegistrationFlow::new(&auth, &navigator, Session::anonymous());

    fill(&mut flow, "secret1");
    let outcome = flow.submit().await.unwrap();

    assert_eq!(
        outcome,
        RegistrationOutcome::Failed(AuthError::new("email already registered"))
    );
    assert_eq!(
        flow.error().map(|err| err.message.as_str()),
        Some("email already registered")
    );
    assert_eq!(flow.form().value(NAME), Some("Ada"));
    assert!(navigator.history().is_empty());
}

#[tokio::test]
async fn authenticated_session_redirects_without_form() {
    let auth = FakeAuth::default();
    let navigator = HistoryNavigator::new();
    let mut flow = RegistrationFlow::new(&auth, &navigator, signed_in());
    assert_eq!(navigator.history(), vec![LIST_PATH.to_string()]);

    let outcome = flow.submit().await.unwrap();
    assert_eq!(outcome, RegistrationOutcome::AlreadySignedIn);
    assert!(auth.calls().is_empty());
}

#[tokio::test]
async fn signing_in_elsewhere_redirects_once() {
    let auth = FakeAuth::default();
    let navigator = HistoryNavigator::new();
    let mut flow = RegistrationFlow::new(&auth, &navigator, Session::anonymous());

    flow.on_session_change(signed_in());
    flow.on_session_change(signed_in());

    assert!(flow.session().is_authenticated());
    assert_eq!(navigator.history(), vec![LIST_PATH.to_string()]);
}
