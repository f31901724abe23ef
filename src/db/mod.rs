//! Database module providing connection management, migrations, and queries.

pub mod stats;
pub mod test_results;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, EntityName,
};
use sea_orm_migration::{MigratorTrait, SchemaManager};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::{Config, DatabaseSettings};
use crate::entity::test_result::Entity as TestResult;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

/// Process-wide handle, opened by the first caller of [`DbPool::shared`].
static SHARED_POOL: OnceCell<DbPool> = OnceCell::const_new();

/// Database handle wrapper.
///
/// The underlying pool holds a single SQLite connection, so every statement
/// and transaction is serialized through it.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration.
    pub async fn new(config: &Config) -> AppResult<Self> {
        Self::connect(&config.database).await
    }

    /// Open the database described by `settings`.
    pub async fn connect(settings: &DatabaseSettings) -> AppResult<Self> {
        // Ensure parent directory exists
        if let Some(path) = settings.file_path()
            && let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Storage(format!("Failed to create database directory: {}", e))
            })?;
        }

        let mut options = ConnectOptions::new(settings.url.clone());
        options
            .max_connections(1)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to open database: {}", e)))?;

        if !settings.is_memory() {
            // Force synchronous writes
            conn.execute_unprepared("PRAGMA synchronous = FULL")
                .await
                .map_err(|e| {
                    AppError::Storage(format!("Failed to set synchronous pragma: {}", e))
                })?;

            conn.execute_unprepared("PRAGMA journal_mode = WAL")
                .await
                .map_err(|e| {
                    AppError::Storage(format!("Failed to set journal_mode pragma: {}", e))
                })?;
        }

        Ok(DbPool { conn })
    }

    /// Get the process-wide pool, opening it on first use.
    ///
    /// Later calls return the same handle regardless of `config`.
    pub async fn shared(config: &Config) -> AppResult<Self> {
        SHARED_POOL
            .get_or_try_init(|| Self::new(config))
            .await
            .cloned()
    }

    /// Get access to the connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Backend of the underlying connection.
    pub fn backend(&self) -> DatabaseBackend {
        self.conn.get_database_backend()
    }

    /// Apply pending schema migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Storage(format!("Migration failed: {}", e)))?;
        info!("Database migrations complete");
        Ok(())
    }

    /// Whether the test results table exists, i.e. migrations have been applied.
    pub async fn has_schema(&self) -> AppResult<bool> {
        SchemaManager::new(&self.conn)
            .has_table(TestResult.table_name())
            .await
            .map_err(|e| AppError::Storage(format!("Failed to inspect schema: {}", e)))
    }

    /// Close the connection. Clones of this pool become unusable.
    pub async fn close(&self) -> AppResult<()> {
        self.conn
            .clone()
            .close()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to close database: {}", e)))
    }
}
