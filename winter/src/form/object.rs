use std::any::Any;

use indexmap::IndexMap;

use crate::form::scalar::{ScalarValue, bind_scalar};
use crate::form::{Constraint, FormData};
use crate::request::HostRequest;

/// A structured object that can be bound from `prefix.field` raw fields.
///
/// This trait is usually derived with
/// [`#[derive(BindObject)]`](derive@crate::BindObject), which binds every
/// field of the struct with [`ObjectBinder::field`], or with
/// [`ObjectBinder::nested`] for fields marked `#[bind(nested)]`.
///
/// # Examples
///
/// ```
/// use winter::form::{BindObject, FieldSpec, ObjectBinder};
///
/// struct Login {
///     email: String,
///     remember: bool,
/// }
///
/// impl BindObject for Login {
///     fn bind_object(binder: &mut ObjectBinder<'_>) -> Self {
///         Self {
///             email: binder.field(FieldSpec::new("email").email().required()),
///             remember: binder.field(FieldSpec::new("remember")),
///         }
///     }
/// }
/// ```
pub trait BindObject: Any + Send + Sized {
    /// Builds the object from the raw fields collected by `binder`.
    ///
    /// This never fails: fields that cannot be bound get their zero value
    /// and an error recorded in the binder.
    fn bind_object(binder: &mut ObjectBinder<'_>) -> Self;
}

/// The description of one field of a [`BindObject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: &'static str,
    required: bool,
    constraint: Constraint,
}

impl FieldSpec {
    /// A field named `name`, not required and with no constraint.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            constraint: Constraint::Text,
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Checks the raw value of the field as an email address.
    #[must_use]
    pub const fn email(mut self) -> Self {
        self.constraint = Constraint::Email;
        self
    }

    /// Checks the raw value of the field as a decimal number.
    #[must_use]
    pub const fn numeric(mut self) -> Self {
        self.constraint = Constraint::Numeric;
        self
    }

    /// The name of the field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// Collects the raw fields of one object and records what binding them
/// produced.
#[derive(Debug)]
pub struct ObjectBinder<'a> {
    prefix: String,
    fields: IndexMap<String, String>,
    form_data: &'a mut FormData,
    invalid: bool,
}

impl<'a> ObjectBinder<'a> {
    /// Collects every raw field whose key starts with `prefix.`, keyed by
    /// the rest of the key.
    pub(crate) fn new(
        prefix: &str,
        request: &dyn HostRequest,
        form_data: &'a mut FormData,
    ) -> Self {
        let start = format!("{prefix}.");
        let fields = request
            .parameter_keys()
            .into_iter()
            .filter_map(|key| {
                let value = request.parameter(&key)?;
                let name = key.strip_prefix(&start)?.to_owned();
                Some((name, value))
            })
            .collect();

        Self {
            prefix: prefix.to_owned(),
            fields,
            form_data,
            invalid: false,
        }
    }

    /// The prefix of the raw fields of this object.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The raw value collected for `name`, without the prefix.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Binds a scalar field.
    ///
    /// A missing field binds to [`ScalarValue::missing`]. Errors are recorded under
    /// `prefix.name` and mark the object invalid.
    pub fn field<T: ScalarValue>(&mut self, spec: FieldSpec) -> T {
        let key = format!("{}.{}", self.prefix, spec.name);
        let raw = self.fields.get(spec.name).cloned();

        let binding = bind_scalar::<T>(raw.as_deref(), spec.required, spec.constraint);
        self.form_data.set_value(&key, raw);
        for error in binding.errors {
            self.invalid = true;
            self.form_data.add_error(&key, error);
        }

        binding.value
    }

    /// Binds a field that is itself a structured object, from the raw
    /// fields named `prefix.name.field`.
    pub fn nested<T: BindObject>(&mut self, name: &str) -> T {
        let start = format!("{name}.");
        let fields = self
            .fields
            .iter()
            .filter_map(|(key, value)| {
                let field = key.strip_prefix(&start)?;
                Some((field.to_owned(), value.clone()))
            })
            .collect();

        let mut binder = ObjectBinder {
            prefix: format!("{}.{name}", self.prefix),
            fields,
            form_data: &mut *self.form_data,
            invalid: false,
        };
        let value = T::bind_object(&mut binder);
        self.invalid |= binder.invalid;
        value
    }

    /// Whether any field of the object has an error.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }
}
