use std::any::Any;

use derive_more::with_trait::Debug;

use crate::form::object::{BindObject, ObjectBinder};
use crate::form::scalar::{ScalarBinding, ScalarKind, ScalarValue, bind_scalar};
use crate::form::{Constraint, UploadedFile};

pub(crate) type BoxedValue = (Box<dyn Any + Send>, &'static str);

pub(crate) type ScalarBindFn = fn(Option<&str>, bool, Constraint) -> ScalarBinding<BoxedValue>;

pub(crate) type ObjectBindFn = fn(&mut ObjectBinder<'_>) -> BoxedValue;

fn boxed<T: Any + Send>(value: T) -> BoxedValue {
    (Box::new(value), std::any::type_name::<T>())
}

fn bind_scalar_boxed<T: ScalarValue>(
    raw: Option<&str>,
    required: bool,
    constraint: Constraint,
) -> ScalarBinding<BoxedValue> {
    let ScalarBinding { value, errors } = bind_scalar::<T>(raw, required, constraint);
    ScalarBinding {
        value: boxed(value),
        errors,
    }
}

fn bind_object_boxed<T: BindObject>(binder: &mut ObjectBinder<'_>) -> BoxedValue {
    boxed(T::bind_object(binder))
}

/// The shape of a parameter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// A value bound from a single raw field.
    Scalar(ScalarKind),
    /// An uploaded file part.
    File,
    /// A structured object bound from `prefix.field` raw fields.
    Object,
}

#[derive(Debug, Copy, Clone)]
pub(crate) enum BindStrategy {
    Scalar(#[debug(skip)] ScalarBindFn),
    File,
    Object(#[debug(skip)] ObjectBindFn),
}

/// The description of one parameter of a controller method.
///
/// Parameter names are explicit: they are the keys looked up in the request.
///
/// # Examples
///
/// ```
/// use winter::form::{Constraint, ParamDescriptor};
///
/// let contact = ParamDescriptor::scalar::<String>("contact").email().required();
/// assert_eq!(contact.name(), "contact");
/// assert_eq!(contact.constraint(), Constraint::Email);
/// assert!(contact.is_required());
/// ```
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    name: String,
    kind: ParamKind,
    type_name: &'static str,
    strategy: BindStrategy,
    required: bool,
    constraint: Constraint,
    prefix: Option<String>,
}

impl ParamDescriptor {
    /// A scalar parameter of type `T`.
    ///
    /// The controller reads it with `Arguments::get::<T>`. When the request
    /// has no value for it, the argument is [`ScalarValue::missing`]: zero
    /// for plain values and `None` for an `Option`.
    #[must_use]
    pub fn scalar<T: ScalarValue>(name: &str) -> Self {
        Self::with_kind(
            name,
            ParamKind::Scalar(T::KIND),
            std::any::type_name::<T>(),
            BindStrategy::Scalar(bind_scalar_boxed::<T>),
        )
    }

    /// An uploaded file parameter.
    ///
    /// The controller reads it with `Arguments::get::<UploadedFile>`.
    #[must_use]
    pub fn file(name: &str) -> Self {
        Self::with_kind(
            name,
            ParamKind::File,
            std::any::type_name::<UploadedFile>(),
            BindStrategy::File,
        )
    }

    /// A structured object parameter of type `T`, bound from the raw fields
    /// named `name.field`.
    ///
    /// The controller reads it with `Arguments::get::<T>`.
    #[must_use]
    pub fn object<T: BindObject>(name: &str) -> Self {
        Self::with_kind(
            name,
            ParamKind::Object,
            std::any::type_name::<T>(),
            BindStrategy::Object(bind_object_boxed::<T>),
        )
    }

    fn with_kind(
        name: &str,
        kind: ParamKind,
        type_name: &'static str,
        strategy: BindStrategy,
    ) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            type_name,
            strategy,
            required: false,
            constraint: Constraint::Text,
            prefix: None,
        }
    }

    /// Marks the parameter as required: a missing value is a
    /// [`FieldError::Required`](crate::form::FieldError::Required) error.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the constraint checked on the raw value.
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Shorthand for `with_constraint(Constraint::Email)`.
    #[must_use]
    pub fn email(self) -> Self {
        self.with_constraint(Constraint::Email)
    }

    /// Shorthand for `with_constraint(Constraint::Numeric)`.
    #[must_use]
    pub fn numeric(self) -> Self {
        self.with_constraint(Constraint::Numeric)
    }

    /// Binds an object parameter from `prefix.field` raw fields instead of
    /// `name.field`.
    #[must_use]
    pub fn prefix<T: Into<String>>(mut self, prefix: T) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// The name of the parameter.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shape of the parameter.
    #[must_use]
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// The Rust type name of the bound argument.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn strategy(&self) -> BindStrategy {
        self.strategy
    }

    /// Whether the parameter is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The constraint checked on the raw value.
    #[must_use]
    pub fn constraint(&self) -> Constraint {
        self.constraint
    }

    /// The prefix of the raw fields of an object parameter.
    #[must_use]
    pub fn object_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(&self.name)
    }
}
