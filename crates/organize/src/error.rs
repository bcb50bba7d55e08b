//! Organize Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Only [`ErrorKind::EmptyResultSet`] and
//! [`ErrorKind::Destination`] (for the root) stop a run; every other kind
//! describes a single file that could not be copied.

use derive_more::{Display, Error};
use std::path::{Path, PathBuf};

/// An organize error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for organize operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// There is nothing to organize.
    #[display("no records to organize")]
    EmptyResultSet,
    /// A destination directory could not be created.
    #[display("destination directory unusable: {}", _0.display())]
    Destination(#[error(not(source))] PathBuf),
    /// The source file does not exist.
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Reading the source or writing the copy failed part way.
    #[display("copy failed: {}", _0.display())]
    Copy(#[error(not(source))] PathBuf),
    /// The source path does not end in a usable file name.
    #[display("no usable file name in path: {_0}")]
    InvalidFileName(#[error(not(source))] String),
}

impl ErrorKind {
    pub(crate) fn from_io(err: &std::io::Error, path: &Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Copy(path.to_path_buf()),
        }
    }
}

/// Wraps an I/O error under the kind describing it, keeping the I/O error as
/// a child in the error tree.
#[track_caller]
pub(crate) fn io_error(err: std::io::Error, path: &Path) -> Error {
    let kind = ErrorKind::from_io(&err, path);
    exn::Exn::from(err).raise(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::EmptyResultSet.to_string(), "no records to organize");
        assert_eq!(ErrorKind::Copy(PathBuf::from("D/Alice/a.jpg")).to_string(), "copy failed: D/Alice/a.jpg");
    }

    #[test]
    fn io_errors_are_classified() {
        let path = Path::new("C:/p/a.jpg");
        let err = io_error(io::Error::new(io::ErrorKind::NotFound, "gone"), path);
        assert_eq!(*err, ErrorKind::NotFound(path.to_path_buf()));
        let err = io_error(io::Error::new(io::ErrorKind::PermissionDenied, "no"), path);
        assert_eq!(*err, ErrorKind::PermissionDenied(path.to_path_buf()));
        let err = io_error(io::Error::other("disk on fire"), path);
        assert_eq!(*err, ErrorKind::Copy(path.to_path_buf()));
    }
}
