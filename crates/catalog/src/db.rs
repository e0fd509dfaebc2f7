//! Database connection and pool management.

use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::time::Duration;
use tracing::instrument;

use crate::config::DatabaseConfig;
use crate::error::{ErrorKind, Result};

/// Embedded migrations that are run automatically on connect.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection pool for the catalog and quota tables.
///
/// Cheap to clone; every repository holds its own handle to the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn new(options: SqliteConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            // Query-based PRAGMAs only stick to the connection they ran on,
            // so they have to be applied to every new connection.
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Connect to the catalog database described by `config`.
    ///
    /// Creates the database file if it doesn't exist and runs migrations.
    #[instrument(skip(config), fields(path = %config.path.display()))]
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let options = Self::base_options()
            .filename(&config.path)
            .create_if_missing(true)
            .busy_timeout(config.busy_timeout());
        Self::new(options, config.max_connections).await
    }

    /// Connect to an in-memory database.
    ///
    /// Not gated behind `#[cfg(test)]`: downstream crates use it in their
    /// tests too. The pool is limited to one connection, otherwise every
    /// connection would see its own empty database.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        Self::new(options, 1).await
    }

    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            // Concurrent quota increments from several tasks queue up on the
            // single writer lock; this is how long each one may wait.
            .busy_timeout(Duration::from_millis(1500))
    }

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

    #[instrument("performing database migrations", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    /// The underlying connection pool, for custom queries or transactions.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Waits for all connections to be returned, then closes them.
    pub async fn close(&self) {
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}
