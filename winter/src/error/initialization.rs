//! Errors raised while building the route registry at startup.
//!
//! All of them are fatal: once one has been recorded, every request is
//! answered with a 500 response until the process is restarted with a
//! corrected configuration.

use thiserror::Error;

use crate::RequestVerb;
use crate::error::error_impl::impl_into_winter_error;

/// The controllers package is not configured.
#[non_exhaustive]
#[derive(Debug, Error)]
#[error("No package provider was found from the configurations")]
pub struct PackageProviderNotFound;
impl_into_winter_error!(PackageProviderNotFound);

/// A request arrived before the front controller was initialized.
#[non_exhaustive]
#[derive(Debug, Error)]
#[error("The front controller has not been initialized")]
pub struct NotInitialized;
impl_into_winter_error!(NotInitialized);

/// The configured controllers package is not a dotted identifier
/// (`identifier(.identifier)*`).
#[non_exhaustive]
#[derive(Debug, Error)]
#[error("Invalid package name from the configurations: `{package}`")]
pub struct InvalidPackageName {
    /// The rejected package name.
    pub package: String,
}
impl_into_winter_error!(InvalidPackageName);

impl InvalidPackageName {
    /// Creates a new `InvalidPackageName` error.
    #[must_use]
    pub fn new<T: Into<String>>(package: T) -> Self {
        Self {
            package: package.into(),
        }
    }
}

/// Two controller methods were declared for the same path and verb.
///
/// # Examples
///
/// ```
/// use winter::RequestVerb;
/// use winter::error::DuplicateMapping;
///
/// let error = DuplicateMapping::new("/users", RequestVerb::Post, "create", "store");
/// assert_eq!(
///     error.to_string(),
///     "Duplicate controller method for the URL '/users': `store` conflicts with `create` on POST"
/// );
/// ```
#[non_exhaustive]
#[derive(Debug, Error)]
#[error(
    "Duplicate controller method for the URL '{path}': `{rejected}` conflicts with `{existing}` on {verb}"
)]
pub struct DuplicateMapping {
    /// The normalized path both methods map to.
    pub path: String,
    /// The verb both methods map to.
    pub verb: RequestVerb,
    /// The method that was registered first and stays in the registry.
    pub existing: String,
    /// The method whose registration was rejected.
    pub rejected: String,
}
impl_into_winter_error!(DuplicateMapping);

impl DuplicateMapping {
    /// Creates a new `DuplicateMapping` error.
    #[must_use]
    pub fn new<P, E, R>(path: P, verb: RequestVerb, existing: E, rejected: R) -> Self
    where
        P: Into<String>,
        E: Into<String>,
        R: Into<String>,
    {
        Self {
            path: path.into(),
            verb,
            existing: existing.into(),
            rejected: rejected.into(),
        }
    }
}
