//! ISO-8601 timestamp codec for note wire fields.
//!
//! Timestamps are written as UTC with millisecond precision and a `Z`
//! suffix (`2024-05-01T10:00:00.000Z`). Any RFC 3339 value is accepted when
//! reading and normalized to UTC.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{Error, Unexpected, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt::Formatter;

/// Formats one timestamp in the wire representation.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses one RFC 3339 timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value.trim()).map(|parsed| parsed.with_timezone(&Utc))
}

pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(value))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    struct TimestampVisitor;

    impl Visitor<'_> for TimestampVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("an RFC 3339 timestamp string")
        }

        fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
            parse_timestamp(v).map_err(|_| Error::invalid_value(Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_str(TimestampVisitor)
}

/// Same codec for optional fields.
pub mod option {
    use super::format_timestamp;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&format_timestamp(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|value| {
            super::parse_timestamp(&value).map_err(|err| {
                serde::de::Error::custom(format!("invalid timestamp `{value}`: {err}"))
            })
        })
        .transpose()
    }
}
