//! Use-case services driven by a UI host.
//!
//! # Responsibility
//! - Orchestrate repository calls, form validation and navigation.
//! - Keep hosts decoupled from transport and storage details.

pub mod note_controller;
pub mod registration;
