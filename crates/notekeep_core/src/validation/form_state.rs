//! Live form state: values, touched fields and the latest report.
//!
//! # Invariants
//! - The report always reflects the current values (re-validated on every
//!   change).
//! - `try_submit` re-validates once more before releasing values.
//! - Errors are displayed only for touched fields.

use crate::validation::schema::{FieldError, FieldValues, Schema, ValidationReport};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A field name that the form's schema does not declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField {
    pub schema: &'static str,
    pub field: String,
}

impl Display for UnknownField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "form `{}` has no field `{}`", self.schema, self.field)
    }
}

impl Error for UnknownField {}

/// Editable form bound to one schema.
#[derive(Debug, Clone)]
pub struct FormState {
    schema: &'static Schema,
    values: FieldValues,
    touched: BTreeSet<&'static str>,
    report: ValidationReport,
}

impl FormState {
    pub fn new(schema: &'static Schema, initial: FieldValues) -> Self {
        let report = schema.validate(&initial);
        Self {
            schema,
            values: initial,
            touched: BTreeSet::new(),
            report,
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Latest report, including errors of untouched fields.
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    /// Updates one field, marks it touched and re-validates.
    pub fn set_field(
        &mut self,
        field: &str,
        value: impl Into<String>,
    ) -> Result<&ValidationReport, UnknownField> {
        let Some(field) = self.schema.resolve_field(field) else {
            return Err(UnknownField {
                schema: self.schema.name(),
                field: field.to_string(),
            });
        };
        self.values.insert(field.to_string(), value.into());
        self.touched.insert(field);
        self.report = self.schema.validate(&self.values);
        Ok(&self.report)
    }

    /// Errors to show next to `field`: empty until the field is touched.
    pub fn visible_errors(&self, field: &str) -> &[FieldError] {
        if self.is_touched(field) {
            self.report.errors_for(field)
        } else {
            &[]
        }
    }

    /// Marks every field touched, re-validates and releases the values when
    /// the report is clean.
    pub fn try_submit(&mut self) -> Result<FieldValues, ValidationReport> {
        self.touched.extend(self.schema.fields().iter().copied());
        self.report = self.schema.validate(&self.values);
        if self.report.is_valid() {
            Ok(self.values.clone())
        } else {
            Err(self.report.clone())
        }
    }

    /// Shows backend messages next to the fields they name and marks those
    /// fields touched. Returns the messages no field claims.
    ///
    /// Attached errors last until the next `set_field` or `try_submit`.
    pub fn attach_rejections(&mut self, messages: &[String]) -> Vec<String> {
        let mut unattributed = Vec::new();
        for message in messages {
            match self.schema.field_named_by(message) {
                Some(field) => {
                    self.touched.insert(field);
                    self.report.push(FieldError::rejected(field, message.clone()));
                }
                None => unattributed.push(message.clone()),
            }
        }
        unattributed
    }

    /// Restores `initial` values and clears touched state.
    pub fn reset(&mut self, initial: FieldValues) {
        self.report = self.schema.validate(&initial);
        self.values = initial;
        self.touched.clear();
    }
}
