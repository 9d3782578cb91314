use notekeep_core::validation::forms::{
    login_form_schema, note_form_defaults, note_form_schema, register_form_defaults,
    register_form_schema, CONFIRM_PASSWORD, DESCRIPTION, EMAIL, NAME, PASSWORD, PRIORITY, TITLE,
};
use notekeep_core::{FieldErrorKind, FieldValues, FormState};

fn values(pairs: &[(&str, &str)]) -> FieldValues {
    pairs
        .iter()
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .collect()
}

#[test]
fn short_title_is_reported_and_blocks_submit() {
    let report = note_form_schema().validate(&values(&[
        (TITLE, "ab"),
        (PRIORITY, "High"),
        (DESCRIPTION, "long enough"),
    ]));

    assert!(!report.is_valid());
    assert_eq!(report.invalid_fields(), vec![TITLE]);
    assert_eq!(
        report.errors_for(TITLE)[0].kind,
        FieldErrorKind::TooShort { min_length: 3 }
    );
    assert_eq!(
        report.messages_for(TITLE),
        vec!["Title should be at least 3 characters"]
    );
    assert!(report.errors_for(DESCRIPTION).is_empty());
}

#[test]
fn boundary_lengths_pass() {
    let report = note_form_schema().validate(&values(&[
        (TITLE, "abc"),
        (PRIORITY, "Low"),
        (DESCRIPTION, "abcdef"),
    ]));
    assert!(report.is_valid());
}

#[test]
fn unknown_priority_reports_category_message() {
    let report = note_form_schema().validate(&values(&[
        (TITLE, "Groceries"),
        (PRIORITY, "high"),
        (DESCRIPTION, "Milk and eggs"),
    ]));

    let errors = report.errors_for(PRIORITY);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0].kind, FieldErrorKind::EnumMismatch { .. }));
    assert_eq!(errors[0].message, "Please select a category");
}

#[test]
fn missing_fields_report_required_once() {
    let report = note_form_schema().validate(&FieldValues::new());
    for field in [TITLE, PRIORITY, DESCRIPTION] {
        let errors = report.errors_for(field);
        assert_eq!(errors.len(), 1, "field {field}");
        assert_eq!(errors[0].kind, FieldErrorKind::Required);
    }
}

#[test]
fn mismatched_passwords_are_reported_on_confirmation_field() {
    let report = register_form_schema().validate(&values(&[
        (NAME, "Ada"),
        (EMAIL, "ada@example.com"),
        (PASSWORD, "secret1"),
        (CONFIRM_PASSWORD, "secret2"),
    ]));

    assert_eq!(report.invalid_fields(), vec![CONFIRM_PASSWORD]);
    assert_eq!(
        report.errors_for(CONFIRM_PASSWORD)[0].kind,
        FieldErrorKind::MismatchedFields { other: PASSWORD }
    );
    assert_eq!(
        report.messages_for(CONFIRM_PASSWORD),
        vec!["Passwords do not match"]
    );
}

#[test]
fn mismatch_is_reported_even_when_password_is_too_short() {
    let report = register_form_schema().validate(&values(&[
        (NAME, "Ada"),
        (EMAIL, "ada@example.com"),
        (PASSWORD, "abc"),
        (CONFIRM_PASSWORD, "abd"),
    ]));

    assert!(!report.errors_for(PASSWORD).is_empty());
    assert!(!report.errors_for(CONFIRM_PASSWORD).is_empty());
}

#[test]
fn email_rule_rejects_malformed_addresses() {
    for email in ["", "ada", "ada@", "@example.com", "ada@example", "a..b@example.com"] {
        let report = login_form_schema().validate(&values(&[
            (EMAIL, email),
            (PASSWORD, "secret1"),
            (CONFIRM_PASSWORD, "secret1"),
        ]));
        assert_eq!(
            report.errors_for(EMAIL)[0].kind,
            FieldErrorKind::InvalidFormat,
            "email {email:?}"
        );
    }

    let report = login_form_schema().validate(&values(&[
        (EMAIL, "ada.lovelace+notes@example.co.uk"),
        (PASSWORD, "secret1"),
        (CONFIRM_PASSWORD, "secret1"),
    ]));
    assert!(report.is_valid());
}

#[test]
fn errors_become_visible_only_after_touch() {
    let mut form = FormState::new(note_form_schema(), note_form_defaults());
    assert!(!form.is_valid());
    assert!(form.visible_errors(TITLE).is_empty());

    form.set_field(TITLE, "ab").unwrap();
    assert_eq!(form.visible_errors(TITLE).len(), 1);
    assert!(form.visible_errors(DESCRIPTION).is_empty());
    assert!(!form.report().errors_for(DESCRIPTION).is_empty());

    form.set_field(TITLE, "abc").unwrap();
    assert!(form.visible_errors(TITLE).is_empty());
}

#[test]
fn try_submit_touches_everything_and_releases_clean_values() {
    let mut form = FormState::new(register_form_schema(), register_form_defaults());
    let report = form.try_submit().unwrap_err();
    assert!(!report.is_valid());
    assert!(form.is_touched(NAME));
    assert!(!form.visible_errors(EMAIL).is_empty());

    form.set_field(NAME, "Ada").unwrap();
    form.set_field(EMAIL, "ada@example.com").unwrap();
    form.set_field(PASSWORD, "secret1").unwrap();
    form.set_field(CONFIRM_PASSWORD, "secret1").unwrap();

    let released = form.try_submit().unwrap();
    assert_eq!(released.get(NAME).map(String::as_str), Some("Ada"));
}

#[test]
fn unknown_field_is_rejected() {
    let mut form = FormState::new(note_form_schema(), note_form_defaults());
    let err = form.set_field("colour", "red").unwrap_err();
    assert_eq!(err.field, "colour");
    assert_eq!(err.schema, "note");
}

#[test]
fn missing_confirmation_is_required_on_registration() {
    let report = register_form_schema().validate(&values(&[
        (NAME, "Ada"),
        (EMAIL, "ada@example.com"),
        (PASSWORD, "secret1"),
    ]));

    assert!(!report.is_valid());
    assert_eq!(report.invalid_fields(), vec![CONFIRM_PASSWORD]);
    assert_eq!(
        report.errors_for(CONFIRM_PASSWORD)[0].kind,
        FieldErrorKind::Required
    );
}

#[test]
fn login_rules_use_login_messages() {
    let report = login_form_schema().validate(&values(&[
        (EMAIL, "not-an-email"),
        (PASSWORD, "abc"),
        (CONFIRM_PASSWORD, "abd"),
    ]));

    assert_eq!(
        report.messages_for(EMAIL),
        vec!["Please enter a valid email"]
    );
    assert_eq!(
        report.messages_for(PASSWORD),
        vec!["Password must be at least 6 characters"]
    );
    assert_eq!(
        report.messages_for(CONFIRM_PASSWORD),
        vec!["Passwords do not match"]
    );
    assert!(report.errors_for(NAME).is_empty());
}

#[test]
fn login_without_confirmation_is_blocked() {
    let report = login_form_schema().validate(&values(&[
        (EMAIL, "ada@example.com"),
        (PASSWORD, "secret1"),
    ]));
    assert_eq!(report.invalid_fields(), vec![CONFIRM_PASSWORD]);
}

#[test]
fn backend_messages_attach_to_the_fields_they_name() {
    let mut form = FormState::new(note_form_schema(), note_form_defaults());
    let leftover = form.attach_rejections(&[
        "description: contains blocked words".to_string(),
        "rate limited".to_string(),
    ]);

    assert_eq!(leftover, vec!["rate limited".to_string()]);
    assert!(form.is_touched(DESCRIPTION));
    let errors = form.visible_errors(DESCRIPTION);
    assert_eq!(errors.last().unwrap().kind, FieldErrorKind::Rejected);
    assert_eq!(
        errors.last().unwrap().message,
        "description: contains blocked words"
    );
    assert!(form.visible_errors(TITLE).is_empty());
}
