//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record exchanged with the notes backend.
//! - Define create/update payloads used by the repository client.
//! - Generate client-side note ids.
//!
//! # Invariants
//! - `id` is never rewritten after creation.
//! - `created_at` is assigned once, at creation time.
//! - Ids generated in one process are strictly increasing.

use crate::model::timestamp;
use chrono::{DateTime, Utc};
use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_GENERATED_MS: AtomicI64 = AtomicI64::new(0);

/// Stable identifier of one note.
///
/// Backends differ in whether they emit ids as strings or numbers, so both
/// are accepted on the wire; the id is always serialized as a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a clock-derived id (epoch milliseconds, decimal).
    ///
    /// Two calls in the same millisecond still yield distinct ids; ids from
    /// different processes may collide.
    pub fn generate() -> Self {
        Self::generate_at(Utc::now().timestamp_millis())
    }

    fn generate_at(now_ms: i64) -> Self {
        let mut previous = LAST_GENERATED_MS.load(Ordering::Acquire);
        loop {
            let next = if now_ms > previous {
                now_ms
            } else {
                previous + 1
            };
            match LAST_GENERATED_MS.compare_exchange_weak(
                previous,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Self(next.to_string()),
                Err(actual) => previous = actual,
            }
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether the id is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NoteIdVisitor;

        impl Visitor<'_> for NoteIdVisitor {
            type Value = NoteId;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("a note id string or integer")
            }

            fn visit_str<E: DeError>(self, v: &str) -> Result<Self::Value, E> {
                Ok(NoteId::new(v))
            }

            fn visit_string<E: DeError>(self, v: String) -> Result<Self::Value, E> {
                Ok(NoteId(v))
            }

            fn visit_u64<E: DeError>(self, v: u64) -> Result<Self::Value, E> {
                Ok(NoteId(v.to_string()))
            }

            fn visit_i64<E: DeError>(self, v: i64) -> Result<Self::Value, E> {
                Ok(NoteId(v.to_string()))
            }
        }

        deserializer.deserialize_any(NoteIdVisitor)
    }
}

/// Note priority. Serialized with its capitalized name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// All priorities in display order.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Wire names in display order.
    pub const NAMES: &'static [&'static str] = &["High", "Medium", "Low"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse failure for [`Priority`]. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPriority(pub String);

impl Display for UnknownPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown priority `{}`; expected one of {}",
            self.0,
            Priority::NAMES.join("|")
        )
    }
}

impl Error for UnknownPriority {}

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| UnknownPriority(s.to_string()))
    }
}

/// Canonical note record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub priority: Priority,
    pub description: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Builds the full-replacement update that keeps this note's creation time.
    pub fn to_changes(&self) -> NoteChanges {
        NoteChanges {
            title: self.title.clone(),
            priority: self.priority,
            description: self.description.clone(),
            created_at: Some(self.created_at),
        }
    }
}

/// Create input. The client stamps `createdAt` when sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub id: NoteId,
    pub title: String,
    pub priority: Priority,
    pub description: String,
}

impl NewNote {
    /// Creates a payload with a freshly generated id.
    pub fn generated(
        title: impl Into<String>,
        priority: Priority,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: NoteId::generate(),
            title: title.into(),
            priority,
            description: description.into(),
        }
    }
}

/// Update input: full replacement of the mutable fields.
///
/// `created_at` is only sent when explicitly supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteChanges {
    pub title: String,
    pub priority: Priority,
    pub description: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub created_at: Option<DateTime<Utc>>,
}
