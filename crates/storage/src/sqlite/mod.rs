use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{DiscoverRepository, RoadmapRepository, SprintRepository, Storage};

mod discover_repo;
mod mapping;
mod migrate;
mod roadmap_repo;
mod sprint_repo;

/// Pool tuning for the `SQLite` adapter.
///
/// Checklist toggles persist in the background without waiting for each
/// other, so several progress merges for one user can be in flight at once.
/// The pool must hand each of them a connection, and `busy_timeout` makes a
/// writer wait for the lock instead of failing with `SQLITE_BUSY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqliteOptions {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            max_connections: 8,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Connect with [`SqliteOptions::default`].
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or
    /// if the connection pragmas fail.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        Self::connect_with(database_url, &SqliteOptions::default()).await
    }

    /// Connect to `SQLite` in WAL mode so dashboard reads never block on a
    /// background progress write.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or
    /// if the connection pragmas fail.
    pub async fn connect_with(
        database_url: &str,
        options: &SqliteOptions,
    ) -> Result<Self, SqliteInitError> {
        let busy_ms = options.busy_timeout.as_millis();
        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections.max(1))
            .acquire_timeout(options.acquire_timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    let busy = format!("PRAGMA busy_timeout = {busy_ms};");
                    sqlx::query(&busy).execute(&mut *conn).await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Bring the schema to the latest version.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// `SQLite` storage with default pool options.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        Self::sqlite_with(database_url, &SqliteOptions::default()).await
    }

    /// Connect, migrate and share one pool across the three repositories.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite_with(
        database_url: &str,
        options: &SqliteOptions,
    ) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect_with(database_url, options).await?;
        repo.migrate().await?;
        let discover: Arc<dyn DiscoverRepository> = Arc::new(repo.clone());
        let roadmaps: Arc<dyn RoadmapRepository> = Arc::new(repo.clone());
        let sprints: Arc<dyn SprintRepository> = Arc::new(repo);
        Ok(Self {
            discover,
            roadmaps,
            sprints,
        })
    }
}
