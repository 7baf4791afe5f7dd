//! Errors raised while resolving a request to a controller method.

use thiserror::Error;

use crate::RequestVerb;
use crate::error::error_impl::impl_into_winter_error;

#[expect(clippy::doc_link_with_quotes, reason = "404 Not Found link")]
/// A ["404 Not Found"] error: no route is registered for the request path.
///
/// # Examples
///
/// ```
/// use winter::error::NotFound;
///
/// let error = NotFound::new("/users");
/// assert_eq!(error.to_string(), "Resource not found for URL: /users");
/// ```
///
/// ["404 Not Found"]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Reference/Status/404
#[non_exhaustive]
#[derive(Debug, Error)]
#[error("Resource not found for URL: {path}")]
pub struct NotFound {
    /// The normalized path that could not be resolved.
    pub path: String,
}
impl_into_winter_error!(NotFound, NOT_FOUND);

impl NotFound {
    /// Creates a new `NotFound` error for the given path.
    #[must_use]
    pub fn new<T: Into<String>>(path: T) -> Self {
        Self { path: path.into() }
    }
}

#[expect(clippy::doc_link_with_quotes, reason = "405 Method Not Allowed link")]
/// A ["405 Method Not Allowed"] error: the path exists, but has no binding for
/// the request verb.
///
/// # Examples
///
/// ```
/// use winter::RequestVerb;
/// use winter::error::MethodNotAllowed;
///
/// let error = MethodNotAllowed::new(RequestVerb::Get, "/users");
/// assert_eq!(error.verb, RequestVerb::Get);
/// ```
///
/// ["405 Method Not Allowed"]: https://developer.mozilla.org/en-US/docs/Web/HTTP/Reference/Status/405
#[non_exhaustive]
#[derive(Debug, Error)]
#[error("method `{verb}` not allowed for the URL: {path}")]
pub struct MethodNotAllowed {
    /// The verb the request was made with.
    pub verb: RequestVerb,
    /// The normalized path of the request.
    pub path: String,
}
impl_into_winter_error!(MethodNotAllowed, METHOD_NOT_ALLOWED);

impl MethodNotAllowed {
    /// Creates a new `MethodNotAllowed` error.
    #[must_use]
    pub fn new<T: Into<String>>(verb: RequestVerb, path: T) -> Self {
        Self {
            verb,
            path: path.into(),
        }
    }
}

/// A "403 Forbidden" error: the binding requires a role the caller does not
/// have.
#[non_exhaustive]
#[derive(Debug, Error)]
#[error("Permission denied")]
pub struct AccessDenied {
    /// The role found in the caller's session, if any.
    pub role: Option<String>,
}
impl_into_winter_error!(AccessDenied, FORBIDDEN);

impl AccessDenied {
    /// Creates a new `AccessDenied` error for the given caller role.
    #[must_use]
    pub fn new(role: Option<String>) -> Self {
        Self { role }
    }
}
