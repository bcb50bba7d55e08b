//! Catalog Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. The SQLite diagnostic is kept as a child of the
//! raised kind, so callers match on the kind and print the tree.

use crate::PartitionId;
use derive_more::{Display, Error};
use std::path::PathBuf;

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The recognition database is missing, unreadable, or not a database.
    #[display("recognition database unavailable: {}", _0.display())]
    Unavailable(#[error(not(source))] PathBuf),
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// No partition is flagged active; recluster or pick one explicitly.
    #[display("no active partition")]
    NoActivePartition,
    #[display("unknown partition: {_0}")]
    UnknownPartition(#[error(not(source))] PartitionId),
    /// The partition has no assignments (left) to export.
    #[display("no records to export")]
    EmptyResultSet,
    #[display("invalid catalog data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}
