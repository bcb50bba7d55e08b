//! Interchange file codec.
//!
//! The interchange file is the only hand-off between exporting groups from the
//! recognition database and sorting photos on disk. Both halves may run on
//! different machines at different times. The format is a fixed two-column
//! header followed by one always-quoted `"person","photo path"` line per
//! [`Record`].
//!
//! - [`encode`] writes through the `csv` crate and never emits anything
//!   [`decode`] would need leniency for.
//! - [`decode`] never fails. Lines it cannot make sense of come back with an
//!   empty field and are dropped (and counted in [`Decoded::dropped`]).
//! - [`read_file`] and [`write_file`] wrap the codec with async file I/O.
//!
//! ```
//! use facesort_interchange::{Record, decode, encode};
//!
//! let records = vec![Record::new("Alice", r#"C:\Photos\"best" of.jpg"#)];
//! let text = encode(&records).unwrap();
//! assert_eq!(text, "Person,Photo Path\n\"Alice\",\"C:\\Photos\\\"\"best\"\" of.jpg\"\n");
//! assert_eq!(decode(&text).records, records);
//! ```

mod decode;
mod encode;
pub mod error;
mod file;

pub use crate::decode::{Decoded, decode};
pub use crate::encode::{GROUP_COLUMN, PATH_COLUMN, encode};
pub use crate::file::{read_file, write_file};

/// A single `(person, photo)` pairing.
///
/// Ordering is derived field-by-field (label first, then path) and compares
/// raw string bytes, never locale-aware collation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Record {
    /// Display label of the group (a person's tag, or a synthetic fallback).
    pub label: String,
    /// Path of the source file, exactly as recorded by the database.
    pub path: String,
}
impl Record {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self { label: label.into(), path: path.into() }
    }

    /// Both fields carry content. Incomplete records never survive decoding.
    pub fn is_complete(&self) -> bool {
        !self.label.is_empty() && !self.path.is_empty()
    }
}
