use std::error::Error as StdError;
use std::fmt::{Display, Write};
use std::ops::Deref;

use derive_more::with_trait::Debug;

use crate::StatusCode;

/// An error that can occur while using Winter.
pub struct Error {
    repr: Box<ErrorImpl>,
}

impl Error {
    /// Create a new error wrapping a custom error message or error type.
    ///
    /// The wrapper does not carry a status code of its own. If there is an
    /// `Error` with a status code further down the chain of sources, that
    /// one is used; otherwise the status is 500 Internal Server Error.
    #[must_use]
    pub fn wrap<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self {
            repr: Box::new(ErrorImpl {
                inner: error.into(),
                status_code: None,
            }),
        }
    }

    /// Create a new error associated with a 500 Internal Server Error status
    /// code.
    ///
    /// # Examples
    ///
    /// ```
    /// use winter::Error;
    ///
    /// let error = Error::internal("An error occurred");
    /// let error = Error::internal(std::io::Error::other("An error occurred"));
    /// ```
    #[must_use]
    pub fn internal<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self::with_status(error, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Create a new error with a specific HTTP status code.
    ///
    /// # Examples
    ///
    /// ```
    /// use winter::{Error, StatusCode};
    ///
    /// let error = Error::with_status("Access denied", StatusCode::FORBIDDEN);
    /// assert_eq!(error.status_code(), StatusCode::FORBIDDEN);
    /// ```
    #[must_use]
    pub fn with_status<E>(error: E, status_code: StatusCode) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        let error = Self {
            repr: Box::new(ErrorImpl {
                inner: error.into(),
                status_code: Some(status_code),
            }),
        };
        Self::wrap(WithStatusCode(error))
    }

    /// Returns the HTTP status code associated with this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use winter::{Error, StatusCode};
    ///
    /// let error = Error::internal("Something went wrong");
    /// assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    ///
    /// let wrapped = Error::wrap(Error::with_status("gone", StatusCode::NOT_FOUND));
    /// assert_eq!(wrapped.status_code(), StatusCode::NOT_FOUND);
    /// ```
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.inner()
            .repr
            .status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the first `Error` in the source chain that carries a status
    /// code, or `self` if there is none.
    ///
    /// Use this to downcast to the concrete error type:
    ///
    /// ```
    /// use winter::Error;
    /// use winter::error::NotFound;
    ///
    /// let error = Error::wrap(Error::from(NotFound::new("/users")));
    /// assert!(error.inner().downcast_ref::<NotFound>().is_some());
    /// ```
    #[must_use]
    pub fn inner(&self) -> &Self {
        let mut error: &dyn StdError = self;
        while let Some(inner) = error.source() {
            if let Some(error) = inner.downcast_ref::<Self>()
                && !error.is_wrapper()
            {
                return error;
            }
            error = inner;
        }
        self
    }

    /// Returns `true` if this error has been created with [`Error::wrap`]
    /// and carries no status code of its own.
    #[must_use]
    pub fn is_wrapper(&self) -> bool {
        self.repr.status_code.is_none()
    }

    /// Renders this error and all of its sources, outermost first, joined by
    /// `": "`. Messages repeated by transparent wrappers are printed once.
    ///
    /// ```
    /// use winter::Error;
    ///
    /// let io = std::io::Error::other("disk full");
    /// let error = Error::internal(io);
    /// assert_eq!(error.chain_message(), "disk full");
    /// ```
    #[must_use]
    pub fn chain_message(&self) -> String {
        let mut message = self.to_string();
        let mut last = message.clone();
        let mut source = StdError::source(self);
        while let Some(error) = source {
            let current = error.to_string();
            if current != last {
                let _ = write!(message, ": {current}");
                last = current;
            }
            source = error.source();
        }
        message
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.repr, f)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.repr.inner, f)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.repr.inner.source()
    }
}

impl Deref for Error {
    type Target = dyn StdError + Send + Sync;

    fn deref(&self) -> &Self::Target {
        &*self.repr.inner
    }
}

#[derive(Debug)]
struct ErrorImpl {
    inner: Box<dyn StdError + Send + Sync>,
    status_code: Option<StatusCode>,
}

/// Indicates that the inner `Error` has a status code associated with it.
///
/// The inner `Error` must be returned by `source` so that
/// [`Error::inner`] can find it.
#[derive(Debug)]
struct WithStatusCode(Error);

impl Display for WithStatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for WithStatusCode {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.0)
    }
}

/// Implements `From<$error_ty> for winter::Error`, optionally with a status
/// code other than 500.
#[macro_export]
macro_rules! impl_into_winter_error {
    ($error_ty:ty) => {
        impl From<$error_ty> for $crate::Error {
            fn from(err: $error_ty) -> Self {
                $crate::Error::internal(err)
            }
        }
    };
    ($error_ty:ty, $status_code:ident) => {
        impl From<$error_ty> for $crate::Error {
            fn from(err: $error_ty) -> Self {
                $crate::Error::with_status(err, $crate::StatusCode::$status_code)
            }
        }
    };
}
pub use impl_into_winter_error;

#[derive(Debug, thiserror::Error)]
#[error("failed to render the error page: {0}")]
struct TemplateRender(#[from] askama::Error);
impl_into_winter_error!(TemplateRender);
impl From<askama::Error> for Error {
    fn from(err: askama::Error) -> Self {
        Error::from(TemplateRender(err))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("could not convert a value to or from JSON: {0}")]
struct JsonConversion(#[from] serde_json::Error);
impl_into_winter_error!(JsonConversion);
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::from(JsonConversion(err))
    }
}
