//! Interchange Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Decoding itself never fails (malformed lines are
//! dropped), so every variant here is about getting text in or out of a file.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An interchange error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for interchange operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The interchange file could not be opened or read.
    #[display("interchange file unreadable: {}", _0.display())]
    Unreadable(#[error(not(source))] PathBuf),
    /// The interchange file is not valid UTF-8.
    #[display("interchange file is not valid UTF-8: {}", _0.display())]
    Encoding(#[error(not(source))] PathBuf),
    /// The interchange file (or its parent directory) could not be written.
    #[display("interchange file unwritable: {}", _0.display())]
    Unwritable(#[error(not(source))] PathBuf),
    /// Records could not be serialized into interchange text.
    #[display("cannot serialize interchange records")]
    Serialize,
}
