//! Repository client error taxonomy and HTTP status mapping.

use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of one repository client operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Backend unreachable, unexpected status, or unreadable response.
    Transport(String),
    /// Backend reports that the addressed resource does not exist.
    NotFound(String),
    /// Input rejected, locally (precondition) or by the backend (400/422).
    Validation(Vec<String>),
}

impl ApiError {
    /// Maps a non-2xx response onto the taxonomy.
    ///
    /// `resource` names the addressed resource for `NotFound` diagnostics.
    pub fn from_status(status: u16, body: &str, resource: &str) -> Self {
        match status {
            404 => Self::NotFound(resource.to_string()),
            400 | 422 => Self::Validation(validation_messages(body)),
            other => Self::Transport(format!("unexpected status {other} from {resource}")),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::NotFound(resource) => write!(f, "not found: {resource}"),
            Self::Validation(messages) if messages.is_empty() => {
                write!(f, "validation error")
            }
            Self::Validation(messages) => write!(f, "validation error: {}", messages.join("; ")),
        }
    }
}

impl Error for ApiError {}

/// Extracts human-readable messages from a rejected request body.
///
/// Accepts a JSON array of strings, an object with an `errors` array (of
/// strings or `{message}` objects) or a `message` string. Falls back to the
/// raw body text.
pub fn validation_messages(body: &str) -> Vec<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return vec![trimmed.to_string()];
    };

    let messages = match &value {
        Value::Array(items) => collect_messages(items),
        Value::Object(map) => match (map.get("errors"), map.get("message")) {
            (Some(Value::Array(items)), _) => collect_messages(items),
            (_, Some(Value::String(message))) => vec![message.clone()],
            _ => Vec::new(),
        },
        Value::String(message) => vec![message.clone()],
        _ => Vec::new(),
    };

    if messages.is_empty() {
        vec![trimmed.to_string()]
    } else {
        messages
    }
}

fn collect_messages(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(message) => Some(message.clone()),
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
        .collect()
}
