//! Error types returned by the framework.
//!
//! Every failure is eventually turned into an [`Error`], which keeps the
//! original cause reachable through [`std::error::Error::source`] and knows
//! which HTTP status class it maps to. The concrete error structs in this
//! module are what the dispatcher and the scanner actually raise; downcast
//! [`Error::inner`] to one of them to find out what happened.

pub(crate) mod error_impl;
mod initialization;
mod invocation;
mod resolution;

pub use error_impl::{Error, impl_into_winter_error};
pub use initialization::{
    DuplicateMapping, InvalidPackageName, NotInitialized, PackageProviderNotFound,
};
pub use invocation::{ArgumentMismatch, FileSave, InvalidReturnType};
pub use resolution::{AccessDenied, MethodNotAllowed, NotFound};
