//! Errors raised while invoking a controller method or handling its result.

use std::path::PathBuf;

use thiserror::Error;

use crate::error::error_impl::impl_into_winter_error;

/// A controller method returned something that is neither a string nor a
/// [`ModelView`](crate::response::ModelView).
#[non_exhaustive]
#[derive(Debug, Error)]
#[error("Controller return type should be either String or ModelView, found `{type_name}`")]
pub struct InvalidReturnType {
    /// The Rust type name of the returned value.
    pub type_name: &'static str,
}
impl_into_winter_error!(InvalidReturnType);

impl InvalidReturnType {
    /// Creates a new `InvalidReturnType` error.
    #[must_use]
    pub fn new(type_name: &'static str) -> Self {
        Self { type_name }
    }
}

/// A controller method read an argument at an index that was not declared,
/// or with a type other than the declared one.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ArgumentMismatch {
    /// No argument was bound at this position.
    #[error("no argument was bound at position {index}")]
    OutOfRange {
        /// The requested position.
        index: usize,
    },
    /// The argument at this position was already taken.
    #[error("the argument at position {index} was already taken")]
    AlreadyTaken {
        /// The requested position.
        index: usize,
    },
    /// The argument is null but was read as a non-optional value.
    #[error("the argument at position {index} is null")]
    Null {
        /// The requested position.
        index: usize,
    },
    /// The argument holds a value of another type.
    #[error("the argument at position {index} is not a `{expected}`")]
    WrongType {
        /// The requested position.
        index: usize,
        /// The type the caller asked for.
        expected: &'static str,
    },
}
impl_into_winter_error!(ArgumentMismatch);

/// An uploaded file could not be written to disk.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FileSave {
    /// The upload has no content.
    #[error("the file `{filename}` has no content")]
    Empty {
        /// The generated filename of the upload.
        filename: String,
    },
    /// Writing the file failed.
    #[error("error saving the file to `{}`", path.display())]
    Io {
        /// The path the file was being written to.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
impl_into_winter_error!(FileSave);
