//! Form validation engine.
//!
//! # Responsibility
//! - Describe form constraints declaratively (`Schema`).
//! - Compute per-field error lists with a pure `validate`.
//! - Track live form state so errors update on every change and are
//!   re-checked right before submission.
//!
//! # Invariants
//! - Validation never performs I/O.
//! - A form with any non-empty error list is never submitted.

pub mod form_state;
pub mod forms;
pub mod schema;
