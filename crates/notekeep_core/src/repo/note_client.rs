//! Notes repository client.
//!
//! # Responsibility
//! - Translate note intents into `/notes` REST calls.
//! - Decode responses into typed `Note` values.
//! - Map HTTP statuses onto `ApiError`.
//!
//! # Invariants
//! - Every operation performs exactly one round trip; nothing is retried or
//!   cached here.
//! - `create_note` stamps `createdAt` with the current UTC time.
//! - Response bodies are parsed, not validated.
//!
//! # See also
//! - `service::note_controller` for caching and refresh policy.

use crate::model::note::{NewNote, Note, NoteChanges, NoteId};
use crate::model::timestamp;
use crate::repo::error::{ApiError, ApiResult};
use crate::repo::transport::{ApiRequest, ApiResponse, Method, Transport};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

const NOTES_SEGMENT: &str = "notes";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateNoteBody<'a> {
    #[serde(flatten)]
    note: &'a NewNote,
    #[serde(with = "timestamp")]
    created_at: DateTime<Utc>,
}

/// Typed client over a [`Transport`].
#[derive(Debug, Clone)]
pub struct NoteClient<T: Transport> {
    transport: T,
}

impl<T: Transport> NoteClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Lists all notes in server-defined order.
    pub async fn list_notes(&self) -> ApiResult<Vec<Note>> {
        let response = self
            .execute(ApiRequest::new(Method::Get, &[NOTES_SEGMENT]))
            .await?;
        decode(&response, "note list")
    }

    /// Fetches one note.
    ///
    /// # Errors
    /// - `Validation` for a blank id (no request is sent).
    /// - `NotFound` when the backend has no such note.
    pub async fn get_note(&self, id: &NoteId) -> ApiResult<Note> {
        ensure_id(id)?;
        let response = self
            .execute(ApiRequest::new(Method::Get, &[NOTES_SEGMENT, id.as_str()]))
            .await?;
        decode(&response, "note")
    }

    /// Creates one note, stamping `createdAt` with the current time.
    pub async fn create_note(&self, note: &NewNote) -> ApiResult<Note> {
        self.create_note_at(note, Utc::now()).await
    }

    /// Creates one note with an explicit creation timestamp.
    pub async fn create_note_at(
        &self,
        note: &NewNote,
        created_at: DateTime<Utc>,
    ) -> ApiResult<Note> {
        ensure_id(&note.id)?;
        let body = to_body(&CreateNoteBody { note, created_at })?;
        let response = self
            .execute(ApiRequest::new(Method::Post, &[NOTES_SEGMENT]).with_body(body))
            .await?;
        decode(&response, "created note")
    }

    /// Replaces title/priority/description of one note.
    ///
    /// `changes.created_at` is sent only when supplied.
    pub async fn update_note(&self, id: &NoteId, changes: &NoteChanges) -> ApiResult<Note> {
        ensure_id(id)?;
        let body = to_body(changes)?;
        let response = self
            .execute(ApiRequest::new(Method::Put, &[NOTES_SEGMENT, id.as_str()]).with_body(body))
            .await?;
        decode(&response, "updated note")
    }

    /// Deletes one note. Deleting an already-deleted id yields `NotFound`.
    pub async fn delete_note(&self, id: &NoteId) -> ApiResult<()> {
        ensure_id(id)?;
        self.execute(ApiRequest::new(
            Method::Delete,
            &[NOTES_SEGMENT, id.as_str()],
        ))
        .await?;
        Ok(())
    }

    async fn execute(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let method = request.method;
        let path = request.path();
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "event=notes_request module=repo status=error method={} path={} error={}",
                    method, path, err
                );
                return Err(err);
            }
        };

        if response.is_success() {
            debug!(
                "event=notes_request module=repo status=ok method={} path={} http_status={}",
                method, path, response.status
            );
            return Ok(response);
        }

        let err = ApiError::from_status(response.status, &response.body, &path);
        warn!(
            "event=notes_request module=repo status=error method={} path={} http_status={}",
            method, path, response.status
        );
        Err(err)
    }
}

fn ensure_id(id: &NoteId) -> ApiResult<()> {
    if id.is_blank() {
        return Err(ApiError::Validation(vec![
            "note id must not be empty".to_string()
        ]));
    }
    Ok(())
}

fn to_body<S: Serialize>(value: &S) -> ApiResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| ApiError::Transport(format!("failed to encode request body: {err}")))
}

fn decode<D: DeserializeOwned>(response: &ApiResponse, what: &str) -> ApiResult<D> {
    serde_json::from_str(&response.body)
        .map_err(|err| ApiError::Transport(format!("malformed {what} response: {err}")))
}
