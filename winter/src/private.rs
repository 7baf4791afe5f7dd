//! Re-exports of the Winter dependencies used by the macros.
//!
//! This is to avoid the need to add them as dependencies to the crate that uses
//! the macros.
//!
//! This is not a public API and should not be used directly.

pub use inventory;
