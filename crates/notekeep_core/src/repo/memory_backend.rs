//! In-process notes backend speaking the same REST contract as the server.
//!
//! # Responsibility
//! - Serve `/notes` list/get/create/replace/delete with JSON bodies.
//! - Reject malformed note bodies (missing fields, unknown priority) with
//!   `400 {"errors": [...]}`. Length rules belong to forms and are not checked.
//! - Allow tests to inject outages and failing statuses.
//!
//! # Invariants
//! - Notes are kept in insertion order; list responses preserve it.
//! - `id` and `createdAt` are never changed by a replace unless `createdAt`
//!   is supplied.
//! - Lock poisoning is reported as a transport failure, never a panic.

use crate::model::note::{Note, NoteId, Priority};
use crate::model::timestamp::parse_timestamp;
use crate::repo::error::{ApiError, ApiResult};
use crate::repo::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::validation::forms::{DESCRIPTION, PRIORITY, TITLE};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

const NOTES_SEGMENT: &str = "notes";

#[derive(Debug, Default)]
struct BackendState {
    notes: Vec<Note>,
    offline: bool,
    scripted: VecDeque<ApiResponse>,
    requests: Vec<(Method, String)>,
}

/// Thread-safe in-memory notes collection.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<BackendState>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with `notes` in the given order.
    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            state: Mutex::new(BackendState {
                notes,
                ..BackendState::default()
            }),
        }
    }

    /// Snapshot of stored notes in server order.
    pub fn notes(&self) -> ApiResult<Vec<Note>> {
        Ok(self.lock()?.notes.clone())
    }

    /// While offline every request fails with `ApiError::Transport`.
    pub fn set_offline(&self, offline: bool) -> ApiResult<()> {
        self.lock()?.offline = offline;
        Ok(())
    }

    /// Queues a canned response returned instead of the next routed request.
    pub fn respond_next_with(&self, status: u16, body: impl Into<String>) -> ApiResult<()> {
        self.lock()?
            .scripted
            .push_back(ApiResponse::new(status, body));
        Ok(())
    }

    /// Requests received so far as `(method, path)`.
    pub fn requests(&self) -> ApiResult<Vec<(Method, String)>> {
        Ok(self.lock()?.requests.clone())
    }

    pub fn request_count(&self) -> ApiResult<usize> {
        Ok(self.lock()?.requests.len())
    }

    fn lock(&self) -> ApiResult<MutexGuard<'_, BackendState>> {
        self.state
            .lock()
            .map_err(|_| ApiError::Transport("in-memory backend lock poisoned".to_string()))
    }
}

#[async_trait]
impl Transport for InMemoryBackend {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let mut state = self.lock()?;
        state.requests.push((request.method, request.path()));

        if state.offline {
            return Err(ApiError::Transport(
                "in-memory backend is offline".to_string(),
            ));
        }
        if let Some(response) = state.scripted.pop_front() {
            return Ok(response);
        }

        Ok(route(&mut state, &request))
    }
}

fn route(state: &mut BackendState, request: &ApiRequest) -> ApiResponse {
    let segments: Vec<&str> = request.segments.iter().map(String::as_str).collect();
    match (request.method, segments.as_slice()) {
        (Method::Get, [NOTES_SEGMENT]) => json_response(200, json!(state.notes)),
        (Method::Get, [NOTES_SEGMENT, id]) => match find_index(state, id) {
            Some(index) => json_response(200, json!(state.notes[index])),
            None => not_found(),
        },
        (Method::Post, [NOTES_SEGMENT]) => create(state, request.body.as_ref()),
        (Method::Put, [NOTES_SEGMENT, id]) => replace(state, id, request.body.as_ref()),
        (Method::Delete, [NOTES_SEGMENT, id]) => match find_index(state, id) {
            Some(index) => {
                state.notes.remove(index);
                json_response(200, json!({}))
            }
            None => not_found(),
        },
        _ => not_found(),
    }
}

fn create(state: &mut BackendState, body: Option<&Value>) -> ApiResponse {
    let Some(object) = body.and_then(Value::as_object) else {
        return rejected(vec!["request body must be a JSON object".to_string()]);
    };
    let fields = match checked_fields(object) {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    let created_at = match optional_timestamp(object) {
        Ok(value) => value.unwrap_or_else(Utc::now),
        Err(response) => return response,
    };
    let id = match object.get("id") {
        Some(Value::String(value)) if !value.trim().is_empty() => NoteId::new(value.clone()),
        Some(Value::Number(value)) => NoteId::new(value.to_string()),
        _ => NoteId::generate(),
    };
    if find_index(state, id.as_str()).is_some() {
        return rejected(vec![format!("note id `{id}` already exists")]);
    }

    let note = Note {
        id,
        title: fields.title,
        priority: fields.priority,
        description: fields.description,
        created_at,
    };
    state.notes.push(note.clone());
    json_response(201, json!(note))
}

fn replace(state: &mut BackendState, id: &str, body: Option<&Value>) -> ApiResponse {
    let Some(index) = find_index(state, id) else {
        return not_found();
    };
    let Some(object) = body.and_then(Value::as_object) else {
        return rejected(vec!["request body must be a JSON object".to_string()]);
    };
    let fields = match checked_fields(object) {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    let created_at = match optional_timestamp(object) {
        Ok(value) => value,
        Err(response) => return response,
    };

    let note = &mut state.notes[index];
    note.title = fields.title;
    note.priority = fields.priority;
    note.description = fields.description;
    if let Some(created_at) = created_at {
        note.created_at = created_at;
    }
    json_response(200, json!(note))
}

struct CheckedFields {
    title: String,
    priority: Priority,
    description: String,
}

fn checked_fields(object: &Map<String, Value>) -> Result<CheckedFields, ApiResponse> {
    let mut errors = Vec::new();
    let mut text = |field: &str| match object.get(field) {
        Some(Value::String(value)) => value.clone(),
        Some(_) => {
            errors.push(format!("{field} must be a string"));
            String::new()
        }
        None => {
            errors.push(format!("{field} is required"));
            String::new()
        }
    };
    let title = text(TITLE);
    let description = text(DESCRIPTION);
    let priority = text(PRIORITY);

    let priority = match priority.parse::<Priority>() {
        Ok(priority) => Some(priority),
        Err(err) => {
            if object.get(PRIORITY).is_some_and(Value::is_string) {
                errors.push(err.to_string());
            }
            None
        }
    };

    match priority {
        Some(priority) if errors.is_empty() => Ok(CheckedFields {
            title,
            priority,
            description,
        }),
        _ => Err(rejected(errors)),
    }
}

fn optional_timestamp(object: &Map<String, Value>) -> Result<Option<DateTime<Utc>>, ApiResponse> {
    match object.get("createdAt") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => parse_timestamp(value)
            .map(Some)
            .map_err(|_| rejected(vec![format!("createdAt `{value}` is not a valid timestamp")])),
        Some(_) => Err(rejected(vec!["createdAt must be a string".to_string()])),
    }
}

fn find_index(state: &BackendState, id: &str) -> Option<usize> {
    state.notes.iter().position(|note| note.id.as_str() == id)
}

fn json_response(status: u16, body: Value) -> ApiResponse {
    ApiResponse::new(status, body.to_string())
}

fn not_found() -> ApiResponse {
    json_response(404, json!({}))
}

fn rejected(messages: Vec<String>) -> ApiResponse {
    json_response(400, json!({ "errors": messages }))
}
