//! Binding of request data to controller arguments.
//!
//! Every controller method declares its parameters with a
//! [`ParamDescriptor`]. Before the method runs, an [`ArgumentBinder`] walks
//! the descriptors in declaration order and turns raw request fields into
//! typed values:
//!
//! - scalar parameters ([`ParamDescriptor::scalar`]) are parsed with their
//!   [`ScalarValue`] implementation and checked against their
//!   [`Constraint`],
//! - file parameters ([`ParamDescriptor::file`]) become an [`UploadedFile`],
//! - object parameters ([`ParamDescriptor::object`]) are built field by field
//!   by a [`BindObject`] implementation, usually derived with
//!   [`#[derive(BindObject)]`](derive@crate::BindObject).
//!
//! Binding never fails because of the user's data: a value that cannot be
//! parsed is replaced with its zero value, and the problem is recorded in the
//! [`FormData`] returned alongside the arguments, so that the view can be
//! rendered again showing the submitted values and their errors.
//!
//! # Examples
//!
//! ```
//! use winter::BindObject;
//! use winter::form::{ArgumentBinder, BindArguments, ParamDescriptor};
//! use winter::test::TestRequestBuilder;
//!
//! #[derive(Debug, Default, BindObject)]
//! struct User {
//!     name: String,
//!     age: u32,
//!     #[bind(email)]
//!     contact: String,
//! }
//!
//! let request = TestRequestBuilder::post("/users")
//!     .param("user.name", "Ann")
//!     .param("user.age", "thirty")
//!     .param("user.contact", "ann@example.com")
//!     .build();
//! let params = [ParamDescriptor::object::<User>("user")];
//!
//! let mut bound = ArgumentBinder.bind(&params, &request)?;
//!
//! assert!(bound.form_data.has_errors());
//! assert_eq!(bound.form_data.error_message("user.age"), "Invalid numeric format");
//! let user: User = bound.arguments.get(0)?;
//! assert_eq!(user.name, "Ann");
//! assert_eq!(user.age, 0);
//! # Ok::<(), winter::Error>(())
//! ```

mod binder;
mod file;
mod object;
mod params;
mod scalar;

use std::borrow::Cow;
use std::sync::LazyLock;

pub use binder::{ArgumentBinder, BindArguments, BoundArguments};
pub use file::{UploadedFile, generate_timestamp_filename};
use indexmap::IndexMap;
pub use object::{BindObject, FieldSpec, ObjectBinder};
pub use params::{ParamDescriptor, ParamKind};
use regex::Regex;
pub use scalar::{ScalarKind, ScalarValue};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Accepts what a decimal number literal looks like: an optional sign, a
/// fraction with at least one digit, and an optional exponent.
static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("numeric pattern is valid")
});

/// An error of a single field, recorded while binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FieldError {
    /// The field is required, but the request has no value for it.
    #[error("Field cannot be empty")]
    Required,
    /// The value is not a number, or not a number of the declared type.
    #[error("Invalid numeric format")]
    InvalidNumeric,
    /// The value is not an email address.
    #[error("Invalid email format")]
    InvalidEmail,
    /// The value is not a boolean.
    #[error("Invalid boolean format")]
    InvalidBoolean,
    /// Custom error with given message.
    #[error("{0}")]
    Custom(Cow<'static, str>),
}

impl FieldError {
    /// Creates a new `FieldError` from a `String`.
    #[must_use]
    pub const fn from_string(message: String) -> Self {
        Self::Custom(Cow::Owned(message))
    }

    /// Creates a new `FieldError` from a static string.
    #[must_use]
    pub const fn from_static(message: &'static str) -> Self {
        Self::Custom(Cow::Borrowed(message))
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A semantic constraint on the string form of a value.
///
/// Constraints are checked on the raw value, independently of whether it
/// could be parsed into the declared type.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// Any text.
    #[default]
    Text,
    /// An email address.
    Email,
    /// A decimal number, with optional sign, fraction and exponent.
    Numeric,
}

impl Constraint {
    /// Checks the raw value against the constraint.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidEmail`] or [`FieldError::InvalidNumeric`]
    /// if the value violates the constraint.
    ///
    /// # Examples
    ///
    /// ```
    /// use winter::form::{Constraint, FieldError};
    ///
    /// assert_eq!(Constraint::Email.check("a@b.com"), Ok(()));
    /// assert_eq!(Constraint::Email.check("not-an-email"), Err(FieldError::InvalidEmail));
    /// assert_eq!(Constraint::Numeric.check("-1.5e3"), Ok(()));
    /// assert_eq!(Constraint::Numeric.check("1,5"), Err(FieldError::InvalidNumeric));
    /// ```
    pub fn check(self, raw: &str) -> Result<(), FieldError> {
        match self {
            Self::Text => Ok(()),
            Self::Email if email_address::EmailAddress::is_valid(raw) => Ok(()),
            Self::Email => Err(FieldError::InvalidEmail),
            Self::Numeric if is_numeric(raw) => Ok(()),
            Self::Numeric => Err(FieldError::InvalidNumeric),
        }
    }
}

pub(crate) fn is_numeric(raw: &str) -> bool {
    NUMERIC.is_match(raw)
}

/// The values and errors of every field bound for one request.
///
/// Keys are parameter names, and `prefix.field` for the fields of object
/// parameters. When binding produces errors, the dispatcher stores the
/// serialized `FormData` in the `formData` request attribute, so that the
/// re-rendered view can show the submitted values next to their errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormData {
    values: IndexMap<String, Option<String>>,
    errors: IndexMap<String, Vec<FieldError>>,
}

impl FormData {
    /// Creates an empty `FormData`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the raw value submitted for `key`.
    pub fn set_value<V: Into<Option<String>>>(&mut self, key: &str, value: V) {
        self.values.insert(key.to_owned(), value.into());
    }

    /// Records an error for `key`.
    pub fn add_error(&mut self, key: &str, error: FieldError) {
        self.errors.entry(key.to_owned()).or_default().push(error);
    }

    /// The raw value submitted for `key`, if any.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Option::as_deref)
    }

    /// The raw value submitted for `key`, or an empty string.
    #[must_use]
    pub fn value_or_empty(&self, key: &str) -> &str {
        self.value(key).unwrap_or_default()
    }

    /// All recorded keys with their raw values, in binding order.
    pub fn values(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    /// The errors recorded for `key`.
    #[must_use]
    pub fn errors(&self, key: &str) -> &[FieldError] {
        self.errors.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// The messages of the errors recorded for `key`, joined with `"; "`,
    /// or an empty string if the field is valid.
    #[must_use]
    pub fn error_message(&self, key: &str) -> String {
        self.errors(key)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Whether any field has an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors.values().any(|errors| !errors.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_grammar() {
        for valid in ["0", "-12", "+3", "1.5", "1.", ".5", "2e10", "-2.5E-3"] {
            assert!(is_numeric(valid), "{valid} should be numeric");
        }
        for invalid in ["", "abc", "1,5", "1e", ".", "--1", "1 "] {
            assert!(!is_numeric(invalid), "{invalid} should not be numeric");
        }
    }

    #[test]
    fn email_constraint() {
        assert_eq!(Constraint::Email.check("a@b.com"), Ok(()));
        assert_eq!(
            Constraint::Email.check("not-an-email"),
            Err(FieldError::InvalidEmail)
        );
        assert_eq!(Constraint::Email.check(""), Err(FieldError::InvalidEmail));
        assert_eq!(Constraint::Text.check(""), Ok(()));
    }

    #[test]
    fn form_data_records_values_and_errors() {
        let mut form_data = FormData::new();
        form_data.set_value("name", Some("Ann".to_owned()));
        form_data.set_value("age", None);
        form_data.add_error("age", FieldError::Required);

        assert_eq!(form_data.value("name"), Some("Ann"));
        assert_eq!(form_data.value_or_empty("age"), "");
        assert_eq!(form_data.errors("age"), [FieldError::Required]);
        assert_eq!(form_data.error_message("age"), "Field cannot be empty");
        assert_eq!(form_data.error_message("name"), "");
        assert!(form_data.has_errors());
    }

    #[test]
    fn form_data_serializes_messages() {
        let mut form_data = FormData::new();
        form_data.set_value("contact", Some("x".to_owned()));
        form_data.add_error("contact", FieldError::InvalidEmail);

        let json = serde_json::to_value(&form_data).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "values": {"contact": "x"},
                "errors": {"contact": ["Invalid email format"]},
            })
        );
    }

    #[test]
    fn custom_field_error() {
        assert_eq!(
            FieldError::from_static("too short").to_string(),
            "too short"
        );
        assert_eq!(
            FieldError::from_string("bad".to_owned()).to_string(),
            "bad"
        );
    }
}
