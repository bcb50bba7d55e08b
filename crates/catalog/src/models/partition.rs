use crate::error::{Error, ErrorKind};
use derive_more::Display;
use exn::ResultExt;
use time::UtcDateTime;

/// Julian day number of the Unix epoch.
const UNIX_EPOCH_JULIAN_DAY: f64 = 2_440_587.5;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Identifier of a partition (a clustering run) in the recognition database.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("{_0}")]
pub struct PartitionId(i64);
impl PartitionId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}
impl From<i64> for PartitionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A clustering run and how much it assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub id: PartitionId,
    /// Distance threshold the clustering was run with.
    pub threshold: f64,
    pub created_at: Option<UtcDateTime>,
    pub is_active: bool,
    /// Distinct person ids in this partition.
    pub persons: u64,
    /// Face assignments in this partition.
    pub assignments: u64,
}

#[derive(sqlx::FromRow)]
pub(crate) struct PartitionRow {
    clustering_id: i64,
    threshold: f64,
    /// SQLite `julianday()`.
    created_at: Option<f64>,
    is_active: i64,
    persons: i64,
    assignments: i64,
}
impl TryFrom<PartitionRow> for Partition {
    type Error = Error;
    fn try_from(row: PartitionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PartitionId(row.clustering_id),
            threshold: row.threshold,
            created_at: row.created_at.map(from_julian_day).transpose()?,
            is_active: row.is_active != 0,
            persons: u64::try_from(row.persons).or_raise(|| ErrorKind::InvalidData("person count"))?,
            assignments: u64::try_from(row.assignments).or_raise(|| ErrorKind::InvalidData("assignment count"))?,
        })
    }
}

fn from_julian_day(day: f64) -> Result<UtcDateTime, Error> {
    let seconds = ((day - UNIX_EPOCH_JULIAN_DAY) * SECONDS_PER_DAY).round();
    if !seconds.is_finite() {
        exn::bail!(ErrorKind::InvalidData("partition creation time"));
    }
    UtcDateTime::from_unix_timestamp(seconds as i64).or_raise(|| ErrorKind::InvalidData("partition creation time"))
}
