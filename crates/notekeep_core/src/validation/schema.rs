//! Declarative form schemas and the pure `validate` function.
//!
//! # Responsibility
//! - Describe per-field rules and cross-field rules as plain data.
//! - Compute a per-field error report from candidate values.
//!
//! # Invariants
//! - `validate` is pure: same values, same report.
//! - Every schema field appears in the report, valid fields with an empty list.
//! - A constrained field (per-field or cross-field rule) missing from the
//!   input reports exactly one `Required` error.
//! - Cross-field rules run after per-field rules and only when both values
//!   are present.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("valid email regex")
});

/// Candidate form values keyed by field name.
pub type FieldValues = BTreeMap<String, String>;

/// One constraint attached to a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Value must be non-empty.
    Required,
    /// Value must have at least this many characters.
    MinLength(usize),
    /// Value must look like an email address.
    Email,
    /// Value must be one of the listed options (exact match).
    OneOf(&'static [&'static str]),
}

/// Machine-readable reason for a field error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    TooShort { min_length: usize },
    Required,
    InvalidFormat,
    EnumMismatch { allowed: &'static [&'static str] },
    MismatchedFields { other: &'static str },
    /// Refused by the backend; the message is the backend's.
    Rejected,
}

/// One validation failure for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, kind: FieldErrorKind, message: Option<&'static str>) -> Self {
        let message = match message {
            Some(message) => message.to_string(),
            None => default_message(field, &kind),
        };
        Self {
            field,
            kind,
            message,
        }
    }

    /// Wraps a backend message attributed to `field`.
    pub fn rejected(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            kind: FieldErrorKind::Rejected,
            message: message.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for FieldError {}

fn default_message(field: &str, kind: &FieldErrorKind) -> String {
    match kind {
        FieldErrorKind::TooShort { min_length } => {
            format!("{field} should be at least {min_length} characters")
        }
        FieldErrorKind::Required => format!("{field} is required"),
        FieldErrorKind::InvalidFormat => format!("{field} has an invalid format"),
        FieldErrorKind::EnumMismatch { allowed } => {
            format!("{field} must be one of {}", allowed.join(", "))
        }
        FieldErrorKind::MismatchedFields { other } => format!("{field} must match {other}"),
        FieldErrorKind::Rejected => format!("{field} was rejected"),
    }
}

#[derive(Debug, Clone)]
struct FieldRule {
    field: &'static str,
    rule: Rule,
    message: Option<&'static str>,
}

#[derive(Debug, Clone)]
struct MatchRule {
    field: &'static str,
    other: &'static str,
    message: Option<&'static str>,
}

/// Declarative description of one form.
#[derive(Debug, Clone)]
pub struct Schema {
    name: &'static str,
    fields: Vec<&'static str>,
    rules: Vec<FieldRule>,
    matches: Vec<MatchRule>,
}

impl Schema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            rules: Vec::new(),
            matches: Vec::new(),
        }
    }

    /// Declares a field without constraints.
    pub fn field(mut self, field: &'static str) -> Self {
        self.declare(field);
        self
    }

    /// Adds a rule reported with its default message.
    pub fn rule(self, field: &'static str, rule: Rule) -> Self {
        self.push_rule(field, rule, None)
    }

    /// Adds a rule reported with a custom message.
    pub fn rule_with_message(self, field: &'static str, rule: Rule, message: &'static str) -> Self {
        self.push_rule(field, rule, Some(message))
    }

    /// Requires `field` to equal `other`; errors are keyed to `field`.
    pub fn must_match(
        mut self,
        field: &'static str,
        other: &'static str,
        message: &'static str,
    ) -> Self {
        self.declare(field);
        self.declare(other);
        self.matches.push(MatchRule {
            field,
            other,
            message: Some(message),
        });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    /// Resolves a caller-supplied field name to the schema's static name.
    pub fn resolve_field(&self, field: &str) -> Option<&'static str> {
        self.fields.iter().copied().find(|known| *known == field)
    }

    /// Field a free-text message is about, judged by its leading word
    /// (`"title already used"` names `title`). Case-insensitive.
    pub fn field_named_by(&self, message: &str) -> Option<&'static str> {
        let lead = message
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == ':')
            .next()?;
        self.fields
            .iter()
            .copied()
            .find(|field| field.eq_ignore_ascii_case(lead))
    }

    /// Computes the error report for `values`.
    pub fn validate(&self, values: &FieldValues) -> ValidationReport {
        let mut errors: BTreeMap<&'static str, Vec<FieldError>> = self
            .fields
            .iter()
            .map(|field| (*field, Vec::new()))
            .collect();

        for field in self.fields.iter().copied() {
            if !values.contains_key(field) && self.is_constrained(field) {
                push_error(
                    &mut errors,
                    FieldError::new(field, FieldErrorKind::Required, None),
                );
            }
        }

        for field_rule in &self.rules {
            let Some(value) = values.get(field_rule.field) else {
                continue;
            };
            if let Some(kind) = check_rule(&field_rule.rule, value) {
                push_error(
                    &mut errors,
                    FieldError::new(field_rule.field, kind, field_rule.message),
                );
            }
        }

        for rule in &self.matches {
            let (Some(value), Some(other_value)) = (values.get(rule.field), values.get(rule.other))
            else {
                continue;
            };
            if value != other_value {
                push_error(
                    &mut errors,
                    FieldError::new(
                        rule.field,
                        FieldErrorKind::MismatchedFields { other: rule.other },
                        rule.message,
                    ),
                );
            }
        }

        ValidationReport { errors }
    }

    /// Whether any per-field or cross-field rule reads `field`.
    fn is_constrained(&self, field: &str) -> bool {
        self.rules.iter().any(|rule| rule.field == field)
            || self
                .matches
                .iter()
                .any(|rule| rule.field == field || rule.other == field)
    }

    fn push_rule(mut self, field: &'static str, rule: Rule, message: Option<&'static str>) -> Self {
        self.declare(field);
        self.rules.push(FieldRule {
            field,
            rule,
            message,
        });
        self
    }

    fn declare(&mut self, field: &'static str) {
        if !self.fields.contains(&field) {
            self.fields.push(field);
        }
    }
}

fn push_error(errors: &mut BTreeMap<&'static str, Vec<FieldError>>, error: FieldError) {
    errors.entry(error.field).or_default().push(error);
}

fn check_rule(rule: &Rule, value: &str) -> Option<FieldErrorKind> {
    match rule {
        Rule::Required if value.is_empty() => Some(FieldErrorKind::Required),
        Rule::MinLength(min_length) if value.chars().count() < *min_length => {
            Some(FieldErrorKind::TooShort {
                min_length: *min_length,
            })
        }
        Rule::Email if !is_email(value) => Some(FieldErrorKind::InvalidFormat),
        Rule::OneOf(allowed) if !allowed.iter().any(|option| *option == value) => {
            Some(FieldErrorKind::EnumMismatch { allowed: *allowed })
        }
        _ => None,
    }
}

fn is_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && EMAIL_RE.is_match(value)
}

/// Per-field validation result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<&'static str, Vec<FieldError>>,
}

impl ValidationReport {
    /// Returns whether every field's error list is empty.
    pub fn is_valid(&self) -> bool {
        self.errors.values().all(Vec::is_empty)
    }

    /// Errors for one field; empty when valid or unknown.
    pub fn errors_for(&self, field: &str) -> &[FieldError] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Human-readable messages for one field.
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.errors_for(field)
            .iter()
            .map(|error| error.message.as_str())
            .collect()
    }

    /// Fields with at least one error, in field-name order.
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        self.errors
            .iter()
            .filter(|(_, errors)| !errors.is_empty())
            .map(|(field, _)| *field)
            .collect()
    }

    /// All errors flattened in field-name order.
    pub fn all_errors(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.values().flatten()
    }

    /// Appends one error to its field's list.
    pub fn push(&mut self, error: FieldError) {
        push_error(&mut self.errors, error);
    }

    /// Full mapping from field name to error list.
    pub fn as_map(&self) -> &BTreeMap<&'static str, Vec<FieldError>> {
        &self.errors
    }
}
