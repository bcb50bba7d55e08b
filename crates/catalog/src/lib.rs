//! Read-only access to the face recognition database.
//!
//! The tagging application owns the database: it detects faces in photos,
//! clusters them into persons (one clustering per run, exactly one of which is
//! flagged active) and lets people attach names to faces. This crate never
//! writes to it. It answers two questions:
//!
//! - which partitions (clusterings) exist, see [`Catalog::partitions`];
//! - which `(person, photo)` pairs belong to a partition, see [`extract`].
//!
//! A person without a name tag is labelled `Person <id>`. Labels are not
//! unique: two persons tagged with the same name end up in one group.

mod db;
pub mod error;
mod extract;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::extract::{ExtractOptions, Extraction, extract};
pub use crate::models::{Partition, PartitionId};
pub use crate::repo::Catalog;
