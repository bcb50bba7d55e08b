//! Sorts photos into one directory per person.
//!
//! Takes the records of an interchange file and copies each photo into
//! `<destination>/<label>/`, where the label is made safe for the target
//! filesystem by a [`PathRules`] implementation. Copies never replace an
//! existing file: `photo.jpg` becomes `photo_1.jpg`, `photo_2.jpg` and so on.
//!
//! Individual copy failures are counted and reported through
//! [`MaterializeEvent::Failed`]; only an empty input or an unusable
//! destination root stops a run.

pub mod error;
mod materialize;
mod rules;

pub use crate::materialize::{MaterializeEvent, Materializer, Summary};
pub use crate::rules::{PathRules, Posix, RulesHandle, Windows};
