//! Note domain model and wire codecs.
//!
//! # Responsibility
//! - Define the data structures exchanged with the notes backend.
//! - Keep wire naming (`camelCase`, ISO-8601 timestamps) in one place.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is a hard delete performed by the backend; there are no
//!   tombstones on the client.

pub mod note;
pub mod timestamp;
