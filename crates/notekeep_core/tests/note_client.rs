use chrono::{TimeZone, Utc};
use notekeep_core::{
    ApiError, ApiRequest, InMemoryBackend, Method, NewNote, Note, NoteChanges, NoteClient, NoteId,
    Priority, Transport,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn note(id: &str, title: &str) -> Note {
    Note {
        id: NoteId::new(id),
        title: title.to_string(),
        priority: Priority::Medium,
        description: format!("{title} description"),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
    }
}

fn client_with(notes: Vec<Note>) -> (NoteClient<Arc<InMemoryBackend>>, Arc<InMemoryBackend>) {
    let backend = Arc::new(InMemoryBackend::with_notes(notes));
    (NoteClient::new(Arc::clone(&backend)), backend)
}

#[tokio::test]
async fn list_returns_notes_in_server_order() {
    let (client, _) = client_with(vec![note("2", "Second"), note("1", "First")]);
    let notes = client.list_notes().await.unwrap();
    let ids: Vec<&str> = notes.iter().map(|note| note.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1"]);
}

#[tokio::test]
async fn create_echoes_fields_and_stamps_created_at() {
    let (client, backend) = client_with(Vec::new());
    let before = Utc::now();

    let input = NewNote::generated("Groceries", Priority::High, "Milk and eggs");
    let created = client.create_note(&input).await.unwrap();

    assert_eq!(created.id, input.id);
    assert_eq!(created.title, "Groceries");
    assert_eq!(created.priority, Priority::High);
    assert_eq!(created.description, "Milk and eggs");
    assert!(created.created_at >= before - chrono::Duration::milliseconds(1));
    assert_eq!(backend.notes().unwrap(), vec![created]);
}

#[tokio::test]
async fn create_with_explicit_timestamp_keeps_it() {
    let (client, _) = client_with(Vec::new());
    let at = Utc.with_ymd_and_hms(2023, 12, 24, 18, 30, 0).unwrap();
    let created = client
        .create_note_at(&NewNote::generated("Gifts", Priority::Low, "Wrap them"), at)
        .await
        .unwrap();
    assert_eq!(created.created_at, at);
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_id_and_creation_time() {
    let original = note("7", "Original");
    let (client, _) = client_with(vec![original.clone()]);

    let changes = NoteChanges {
        title: "A".to_string(),
        priority: Priority::Low,
        description: "abcdef".to_string(),
        created_at: None,
    };
    let updated = client.update_note(&original.id, &changes).await.unwrap();
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.title, "A");
    assert_eq!(updated.priority, Priority::Low);
    assert_eq!(updated.description, "abcdef");
    assert_eq!(updated.created_at, original.created_at);

    let fetched = client.get_note(&original.id).await.unwrap();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn delete_twice_yields_not_found() {
    let (client, _) = client_with(vec![note("1", "First")]);
    let id = NoteId::new("1");

    client.delete_note(&id).await.unwrap();
    let err = client.delete_note(&id).await.unwrap_err();
    assert!(err.is_not_found());

    let err = client.get_note(&id).await.unwrap_err();
    assert_eq!(err, ApiError::NotFound("/notes/1".to_string()));
}

#[tokio::test]
async fn blank_id_fails_without_sending_a_request() {
    let (client, backend) = client_with(vec![note("1", "First")]);
    let blank = NoteId::new("  ");

    assert!(matches!(
        client.get_note(&blank).await,
        Err(ApiError::Validation(_))
    ));
    assert!(matches!(
        client.delete_note(&blank).await,
        Err(ApiError::Validation(_))
    ));
    assert_eq!(backend.request_count().unwrap(), 0);
}

#[tokio::test]
async fn statuses_map_onto_error_kinds() {
    let (client, backend) = client_with(Vec::new());

    backend.respond_next_with(500, "boom").unwrap();
    assert!(matches!(
        client.list_notes().await,
        Err(ApiError::Transport(_))
    ));

    backend
        .respond_next_with(422, r#"{"errors":[{"message":"title taken"}]}"#)
        .unwrap();
    let err = client
        .create_note(&NewNote::generated("Dup", Priority::Low, "abcdef"))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Validation(vec!["title taken".to_string()]));

    backend.respond_next_with(200, "not json").unwrap();
    assert!(matches!(
        client.list_notes().await,
        Err(ApiError::Transport(_))
    ));
}

#[tokio::test]
async fn offline_backend_is_a_transport_error() {
    let (client, backend) = client_with(vec![note("1", "First")]);
    backend.set_offline(true).unwrap();
    assert!(matches!(
        client.list_notes().await,
        Err(ApiError::Transport(_))
    ));

    backend.set_offline(false).unwrap();
    assert_eq!(client.list_notes().await.unwrap().len(), 1);
}

#[tokio::test]
async fn requests_follow_the_rest_contract() {
    let (client, backend) = client_with(vec![note("1", "First")]);
    let id = NoteId::new("1");

    client.list_notes().await.unwrap();
    client.get_note(&id).await.unwrap();
    client
        .update_note(&id, &note("1", "Renamed").to_changes())
        .await
        .unwrap();
    client.delete_note(&id).await.unwrap();

    assert_eq!(
        backend.requests().unwrap(),
        vec![
            (Method::Get, "/notes".to_string()),
            (Method::Get, "/notes/1".to_string()),
            (Method::Put, "/notes/1".to_string()),
            (Method::Delete, "/notes/1".to_string()),
        ]
    );
}

#[tokio::test]
async fn malformed_bodies_are_rejected_by_the_backend() {
    let (client, backend) = client_with(vec![note("1", "First")]);

    let response = backend
        .send(
            ApiRequest::new(Method::Post, &["notes"])
                .with_body(json!({"title": "x", "priority": "Urgent"})),
        )
        .await
        .unwrap();
    assert_eq!(response.status, 400);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);

    let duplicate = NewNote {
        id: NoteId::new("1"),
        title: "Again".to_string(),
        priority: Priority::Low,
        description: "same id".to_string(),
    };
    let err = client.create_note(&duplicate).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(backend.notes().unwrap().len(), 1);
}
