//! Database connection and pool management.

use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// Schema of the recognition database, only ever applied to in-memory databases.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// Extraction issues one query at a time.
const MAX_CONNECTIONS: u32 = 1;

/// Connection pool for the recognition database.
///
/// Files on disk are opened read-only and are never created or migrated: the
/// tagging application owns the schema. In-memory databases get the schema
/// applied on connect so they can be seeded.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn new(options: SqliteConnectOptions) -> sqlx::Result<Self> {
        let pool = SqlitePoolOptions::new()
            // Applies the query-based PRAGMAs to every connection the pool
            // opens, not just the first one.
            .after_connect(|conn, meta| Box::pin(async move {
                Self::apply_pragmas(conn, meta).await
            }))
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Open the recognition database at the given path, read-only.
    ///
    /// Fails with [`ErrorKind::Unavailable`] when the file does not exist,
    /// cannot be opened, or is not an SQLite database.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = Self::base_options().filename(path).read_only(true).create_if_missing(false);
        let db = Self::new(options).await.or_raise(|| ErrorKind::Unavailable(path.to_path_buf()))?;
        // SQLite only notices a file is not a database on first read.
        sqlx::query("SELECT COUNT(*) FROM sqlite_master")
            .execute(&db.pool)
            .await
            .or_raise(|| ErrorKind::Unavailable(path.to_path_buf()))?;
        tracing::debug!("Opened recognition database");
        Ok(db)
    }

    /// Connect to an in-memory database with the schema applied.
    ///
    /// Note:
    /// - In-memory databases are destroyed when the connection closes.
    /// - Not `#[cfg(test)]` so that other crates can also use this in their tests.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        // The pool is limited to one connection, otherwise parallel
        // connections would each see their own empty database.
        let db = Self::new(options).await.or_raise(|| ErrorKind::Database)?;
        db.migrate().await?;
        Ok(db)
    }

    /// Base connection options shared between file and in-memory databases.
    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .foreign_keys(true)
            // The tagging application may be writing while we read.
            .busy_timeout(std::time::Duration::from_millis(1500))
    }

    /// Apply additional PRAGMA settings that aren't exposed via SqliteConnectOptions.
    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA cache_size = -8192;
                PRAGMA temp_store = MEMORY;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    #[instrument("applying recognition schema")]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    ///
    /// Waits for all connections to be returned to the pool and then closes
    /// them. The Database instance should not be used afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
