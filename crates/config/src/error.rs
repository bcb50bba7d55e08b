//! Config Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An explicitly requested config file is missing or has an unknown format.
    #[display("cannot load config file: {}", _0.display())]
    Load(#[error(not(source))] PathBuf),
    /// A setting has a value that cannot be used.
    #[display("invalid configuration: {_0}")]
    Invalid(#[error(not(source))] String),
}
