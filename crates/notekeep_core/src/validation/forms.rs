//! Built-in form schemas: note editor, registration and login.

use crate::model::note::{Note, Priority};
use crate::validation::schema::{FieldValues, Rule, Schema};
use once_cell::sync::Lazy;

pub const TITLE: &str = "title";
pub const PRIORITY: &str = "priority";
pub const DESCRIPTION: &str = "description";
pub const NAME: &str = "name";
pub const EMAIL: &str = "email";
pub const PASSWORD: &str = "password";
pub const CONFIRM_PASSWORD: &str = "confirmPassword";

pub const TITLE_MIN_LENGTH: usize = 3;
pub const DESCRIPTION_MIN_LENGTH: usize = 6;
pub const NAME_MIN_LENGTH: usize = 3;
pub const PASSWORD_MIN_LENGTH: usize = 6;

static NOTE_FORM: Lazy<Schema> = Lazy::new(|| {
    Schema::new("note")
        .rule_with_message(
            TITLE,
            Rule::MinLength(TITLE_MIN_LENGTH),
            "Title should be at least 3 characters",
        )
        .rule_with_message(
            PRIORITY,
            Rule::OneOf(Priority::NAMES),
            "Please select a category",
        )
        .rule_with_message(
            DESCRIPTION,
            Rule::MinLength(DESCRIPTION_MIN_LENGTH),
            "Description should be at least 6 characters",
        )
});

static REGISTER_FORM: Lazy<Schema> = Lazy::new(|| {
    Schema::new("register")
        .rule_with_message(
            NAME,
            Rule::MinLength(NAME_MIN_LENGTH),
            "Name should be at least 3 characters long",
        )
        .rule_with_message(EMAIL, Rule::Email, "Please enter a valid email")
        .rule_with_message(
            PASSWORD,
            Rule::MinLength(PASSWORD_MIN_LENGTH),
            "Password must be at least 6 characters",
        )
        .must_match(CONFIRM_PASSWORD, PASSWORD, "Passwords do not match")
});

static LOGIN_FORM: Lazy<Schema> = Lazy::new(|| {
    Schema::new("login")
        .rule_with_message(EMAIL, Rule::Email, "Please enter a valid email")
        .rule_with_message(
            PASSWORD,
            Rule::MinLength(PASSWORD_MIN_LENGTH),
            "Password must be at least 6 characters",
        )
        .must_match(CONFIRM_PASSWORD, PASSWORD, "Passwords do not match")
});

/// Schema for the note create/edit form.
pub fn note_form_schema() -> &'static Schema {
    &NOTE_FORM
}

/// Schema for the sign-up form.
pub fn register_form_schema() -> &'static Schema {
    &REGISTER_FORM
}

/// Schema for the sign-in form.
pub fn login_form_schema() -> &'static Schema {
    &LOGIN_FORM
}

/// Initial values for an empty note form (priority preselected as `Medium`).
pub fn note_form_defaults() -> FieldValues {
    FieldValues::from([
        (TITLE.to_string(), String::new()),
        (PRIORITY.to_string(), Priority::default().as_str().to_string()),
        (DESCRIPTION.to_string(), String::new()),
    ])
}

/// Form values pre-populated from an existing note.
pub fn note_form_values(note: &Note) -> FieldValues {
    FieldValues::from([
        (TITLE.to_string(), note.title.clone()),
        (PRIORITY.to_string(), note.priority.as_str().to_string()),
        (DESCRIPTION.to_string(), note.description.clone()),
    ])
}

/// Empty values for the registration form.
pub fn register_form_defaults() -> FieldValues {
    [NAME, EMAIL, PASSWORD, CONFIRM_PASSWORD]
        .into_iter()
        .map(|field| (field.to_string(), String::new()))
        .collect()
}

/// Typed note fields extracted from values that passed the note schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFormFields {
    pub title: String,
    pub priority: Priority,
    pub description: String,
}

impl NoteFormFields {
    /// Extracts typed fields; `None` when a field is missing or the priority
    /// does not parse.
    pub fn from_values(values: &FieldValues) -> Option<Self> {
        Some(Self {
            title: values.get(TITLE)?.clone(),
            priority: values.get(PRIORITY)?.parse().ok()?,
            description: values.get(DESCRIPTION)?.clone(),
        })
    }
}
