//! Repository client for the notes REST collection.
//!
//! # Responsibility
//! - Define the transport seam and its HTTP and in-memory implementations.
//! - Expose typed note operations with semantic errors (`NotFound`,
//!   `Validation`) in addition to transport failures.
//!
//! # Invariants
//! - The backend is the only writable copy of notes; nothing here caches.
//! - No automatic retries.

pub mod error;
pub mod http_transport;
pub mod memory_backend;
pub mod note_client;
pub mod transport;
