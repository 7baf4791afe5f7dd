use std::any::Any;

use crate::form::{Constraint, FieldError, is_numeric};

/// The family a [`ScalarValue`] belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Free text.
    Text,
    /// A whole number.
    Integer,
    /// A floating point number.
    Float,
    /// `true` or `false`.
    Boolean,
}

/// A value that can be bound from a single raw request field.
///
/// # Examples
///
/// ```
/// use winter::form::{FieldError, ScalarValue};
///
/// assert_eq!(i32::parse("42"), Ok(42));
/// assert_eq!(i32::parse("4.2"), Err(FieldError::InvalidNumeric));
/// assert_eq!(u8::missing(), 0);
/// assert_eq!(<Option<u8>>::missing(), None);
/// ```
pub trait ScalarValue: Any + Send + Sized {
    /// The family of the value.
    const KIND: ScalarKind;

    /// Parses the raw string form of the value.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] if the value cannot be parsed.
    fn parse(raw: &str) -> Result<Self, FieldError>;

    /// The value substituted when parsing fails.
    fn zero() -> Self;

    /// The value bound when the request has no value for the field.
    fn missing() -> Self {
        Self::zero()
    }
}

impl ScalarValue for String {
    const KIND: ScalarKind = ScalarKind::Text;

    fn parse(raw: &str) -> Result<Self, FieldError> {
        Ok(raw.to_owned())
    }

    fn zero() -> Self {
        Self::new()
    }
}

impl ScalarValue for bool {
    const KIND: ScalarKind = ScalarKind::Boolean;

    fn parse(raw: &str) -> Result<Self, FieldError> {
        if ["true", "on", "1"]
            .iter()
            .any(|accepted| raw.eq_ignore_ascii_case(accepted))
        {
            Ok(true)
        } else if ["false", "off", "0"]
            .iter()
            .any(|accepted| raw.eq_ignore_ascii_case(accepted))
        {
            Ok(false)
        } else {
            Err(FieldError::InvalidBoolean)
        }
    }

    fn zero() -> Self {
        false
    }
}

macro_rules! impl_number_as_scalar {
    ($type:ty, $kind:ident) => {
        impl ScalarValue for $type {
            const KIND: ScalarKind = ScalarKind::$kind;

            fn parse(raw: &str) -> Result<Self, FieldError> {
                if !is_numeric(raw) {
                    return Err(FieldError::InvalidNumeric);
                }
                raw.parse().map_err(|_| FieldError::InvalidNumeric)
            }

            fn zero() -> Self {
                <$type>::default()
            }
        }
    };
}

impl_number_as_scalar!(i8, Integer);
impl_number_as_scalar!(i16, Integer);
impl_number_as_scalar!(i32, Integer);
impl_number_as_scalar!(i64, Integer);
impl_number_as_scalar!(i128, Integer);
impl_number_as_scalar!(isize, Integer);
impl_number_as_scalar!(u8, Integer);
impl_number_as_scalar!(u16, Integer);
impl_number_as_scalar!(u32, Integer);
impl_number_as_scalar!(u64, Integer);
impl_number_as_scalar!(u128, Integer);
impl_number_as_scalar!(usize, Integer);
impl_number_as_scalar!(f32, Float);
impl_number_as_scalar!(f64, Float);

impl<T: ScalarValue> ScalarValue for Option<T> {
    const KIND: ScalarKind = T::KIND;

    fn parse(raw: &str) -> Result<Self, FieldError> {
        T::parse(raw).map(Some)
    }

    fn zero() -> Self {
        Some(T::zero())
    }

    fn missing() -> Self {
        None
    }
}

/// The outcome of binding one raw field.
#[derive(Debug)]
pub(crate) struct ScalarBinding<T> {
    pub(crate) value: T,
    pub(crate) errors: Vec<FieldError>,
}

/// Binds one raw field.
///
/// A missing value becomes [`ScalarValue::missing`], is not parsed nor
/// checked, and is a [`FieldError::Required`] error when `required` is set.
/// A value that fails to parse becomes [`ScalarValue::zero`]. The constraint
/// is checked on the raw value whether parsing succeeded or not, and the
/// same error is recorded at most once.
pub(crate) fn bind_scalar<T: ScalarValue>(
    raw: Option<&str>,
    required: bool,
    constraint: Constraint,
) -> ScalarBinding<T> {
    let Some(raw) = raw else {
        return ScalarBinding {
            value: T::missing(),
            errors: if required {
                vec![FieldError::Required]
            } else {
                Vec::new()
            },
        };
    };

    let mut errors = Vec::new();
    let value = T::parse(raw).unwrap_or_else(|error| {
        errors.push(error);
        T::zero()
    });
    if let Err(error) = constraint.check(raw)
        && !errors.contains(&error)
    {
        errors.push(error);
    }

    ScalarBinding { value, errors }
}
