//! Contracts consumed from the host: auth provider, session and navigation.
//!
//! # Responsibility
//! - Describe the external collaborators the core calls into.
//! - Keep session state an explicit, read-only value handed to flows.
//!
//! # Invariants
//! - A present session user means "authenticated".
//! - The core never mutates a session; hosts replace it.

use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// Authenticated user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub name: String,
    pub email: String,
}

/// Read-only snapshot of the host's auth session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<SessionUser>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Error reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "auth provider error: {}", self.message)
    }
}

impl Error for AuthError {}

/// External authentication provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError>;
}

#[async_trait]
impl<A: AuthProvider + ?Sized> AuthProvider for &A {
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError> {
        (**self).sign_up(name, email, password).await
    }
}

/// Host routing surface.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}

impl<N: Navigator + ?Sized> Navigator for &N {
    fn navigate_to(&self, path: &str) {
        (**self).navigate_to(path)
    }
}

/// Navigator that records visited paths. Used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visited paths, oldest first.
    pub fn history(&self) -> Vec<String> {
        match self.history.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn current(&self) -> Option<String> {
        match self.history.lock() {
            Ok(history) => history.last().cloned(),
            Err(poisoned) => poisoned.into_inner().last().cloned(),
        }
    }
}

impl Navigator for HistoryNavigator {
    fn navigate_to(&self, path: &str) {
        info!("event=navigate module=session status=ok path={path}");
        match self.history.lock() {
            Ok(mut history) => history.push(path.to_string()),
            Err(poisoned) => poisoned.into_inner().push(path.to_string()),
        }
    }
}
