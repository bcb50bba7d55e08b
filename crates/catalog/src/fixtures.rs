//! Seeding helpers for databases created by [`Database::connect_in_memory`].
//!
//! Available to this crate's tests and, through the `fixtures` feature, to
//! other crates' dev dependencies.

use crate::error::{ErrorKind, Result};
use crate::{Database, PartitionId};
use exn::ResultExt;
use sqlx::SqlitePool;

/// Inserts rows the way the tagging application would.
pub struct Seeder<'a> {
    pool: &'a SqlitePool,
}
impl<'a> Seeder<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { pool: db.pool() }
    }

    pub async fn partition(&self, threshold: f64, active: bool) -> Result<PartitionId> {
        let id: i64 = sqlx::query_scalar("INSERT INTO clusterings (threshold, is_active) VALUES (?, ?) RETURNING clustering_id")
            .bind(threshold)
            .bind(active)
            .fetch_one(self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(PartitionId::new(id))
    }

    /// Returns the id of the photo at `path`, inserting it when new.
    pub async fn photo(&self, path: &str) -> Result<i64> {
        sqlx::query("INSERT OR IGNORE INTO photos (file_path, scan_status) VALUES (?, 'completed')")
            .bind(path)
            .execute(self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        sqlx::query_scalar("SELECT photo_id FROM photos WHERE file_path = ?")
            .bind(path)
            .fetch_one(self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    pub async fn face(&self, photo: i64) -> Result<i64> {
        sqlx::query_scalar("INSERT INTO faces (photo_id, bbox_x1, bbox_y1, bbox_x2, bbox_y2) VALUES (?, 0, 0, 1, 1) RETURNING face_id")
            .bind(photo)
            .fetch_one(self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    pub async fn assign(&self, face: i64, partition: PartitionId, person: i64) -> Result<()> {
        sqlx::query("INSERT INTO cluster_assignments (face_id, clustering_id, person_id, confidence_score) VALUES (?, ?, ?, 1.0)")
            .bind(face)
            .bind(partition.get())
            .bind(person)
            .execute(self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    pub async fn tag(&self, face: i64, name: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO face_tags (face_id, tag_name) VALUES (?, ?)")
            .bind(face)
            .bind(name)
            .execute(self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    pub async fn hide_person(&self, partition: PartitionId, person: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO hidden_persons (clustering_id, person_id) VALUES (?, ?)")
            .bind(partition.get())
            .bind(person)
            .execute(self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    pub async fn hide_face(&self, face: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO hidden_photos (face_id) VALUES (?)")
            .bind(face)
            .execute(self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    /// A new face in the photo at `path`, assigned to `person` and optionally
    /// tagged. Returns the face id.
    pub async fn detection(&self, path: &str, partition: PartitionId, person: i64, tag: Option<&str>) -> Result<i64> {
        let face = self.face(self.photo(path).await?).await?;
        self.assign(face, partition, person).await?;
        if let Some(name) = tag {
            self.tag(face, name).await?;
        }
        Ok(face)
    }
}
