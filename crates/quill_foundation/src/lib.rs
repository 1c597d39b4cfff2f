//! Core values, types, and errors for Quill.
//!
//! This crate provides:
//! - [`Value`] - The dynamically-typed runtime value
//! - [`Type`] - Type descriptors used in runtime type errors
//! - [`Diagnostic`] - `{line, message}` records from the lexer and parser
//! - [`Error`] - Error type with a categorized [`ErrorKind`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod diagnostic;
pub mod error;
pub mod types;
pub mod value;

pub use diagnostic::Diagnostic;
pub use error::{Error, ErrorKind, SemanticLimit};
pub use types::Type;
pub use value::Value;

/// Result type alias using the Quill [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
