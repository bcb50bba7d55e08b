//! Queries against the recognition database.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{GroupedRow, Partition, PartitionId, PartitionRow};
use exn::ResultExt;
use facesort_interchange::Record;
use sqlx::SqlitePool;

/// Read-only view over partitions and their face assignments.
#[derive(Debug, Clone)]
pub struct Catalog {
    pool: SqlitePool,
}
impl From<&Database> for Catalog {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Catalog {
    /// The partition flagged active.
    ///
    /// Exactly one partition is expected to be active. When several are, the
    /// most recent (highest id) wins and a warning is logged.
    pub async fn active_partition(&self) -> Result<PartitionId> {
        let active: Vec<i64> = sqlx::query_scalar(include_str!("../queries/active_partition.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let Some(&id) = active.first() else {
            exn::bail!(ErrorKind::NoActivePartition);
        };
        if active.len() > 1 {
            tracing::warn!(?active, chosen = id, "Several partitions are flagged active, using the most recent");
        }
        Ok(PartitionId::new(id))
    }

    pub async fn partition_exists(&self, partition: PartitionId) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar(include_str!("../queries/partition_exists.sql"))
            .bind(partition.get())
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(exists != 0)
    }

    /// Use the requested partition if there is one (it must exist), otherwise
    /// the active one.
    pub async fn resolve_partition(&self, requested: Option<PartitionId>) -> Result<PartitionId> {
        let Some(partition) = requested else {
            return self.active_partition().await;
        };
        if !self.partition_exists(partition).await? {
            exn::bail!(ErrorKind::UnknownPartition(partition));
        }
        Ok(partition)
    }

    /// Every partition, oldest first, with its assignment counts.
    pub async fn partitions(&self) -> Result<Vec<Partition>> {
        let rows: Vec<PartitionRow> = sqlx::query_as(include_str!("../queries/list_partitions.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Partition::try_from).collect()
    }

    /// One record per face assignment in `partition`, ordered by label then path.
    ///
    /// Faces without a name tag are labelled `Person <person id>`. When
    /// `exclude_hidden` is set, assignments of persons hidden in this partition
    /// and of individually hidden faces are left out.
    pub async fn grouped_records(&self, partition: PartitionId, exclude_hidden: bool) -> Result<Vec<Record>> {
        let rows: Vec<GroupedRow> = sqlx::query_as(include_str!("../queries/grouped_records.sql"))
            .bind(partition.get())
            .bind(exclude_hidden)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let total = rows.len();
        let records: Vec<_> = rows.into_iter().filter_map(GroupedRow::into_record).collect();
        if records.len() < total {
            tracing::debug!(skipped = total - records.len(), "Skipped assignments without a label or path");
        }
        Ok(records)
    }
}
