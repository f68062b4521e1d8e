use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::ConnectOptions;

use super::broker::StorageBroker;
use super::error::StorageError;
use crate::shared::config::{self, Config, DatabaseConfig};
use crate::shared::schema::{ddl, ModelSchemas};

static BROKER: OnceCell<StorageBroker> = OnceCell::new();

/// Per-connection settings; applied again whenever the pool opens a connection
pub fn connect_options(cfg: &DatabaseConfig) -> anyhow::Result<SqliteConnectOptions> {
    let url = config::build_sqlite_url(cfg)?;
    if !cfg.foreign_keys {
        tracing::warn!("Foreign key enforcement by SQLite is disabled");
    }
    let options = SqliteConnectOptions::from_str(&url)?
        .foreign_keys(cfg.foreign_keys)
        .disable_statement_logging();
    Ok(options)
}

pub fn pool_options(cfg: &DatabaseConfig) -> SqlitePoolOptions {
    let options = SqlitePoolOptions::new().max_connections(1);
    if cfg.is_in_memory() {
        // The in-memory database is dropped together with its only connection
        options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options
    }
}

/// Open a connection described by the configuration
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    if !cfg.is_in_memory() {
        let db_file = config::get_database_path(cfg)?;
        if let Some(parent) = db_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = pool_options(cfg)
        .connect_with(connect_options(cfg)?)
        .await?;
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// Register every schema and make sure the database matches it.
///
/// Runs once per storage engine instance, before any read or write.
/// A malformed schema aborts initialization.
pub async fn initialize_storage(conn: DatabaseConnection) -> Result<StorageBroker, StorageError> {
    let schemas = ModelSchemas::build()?;
    tracing::info!("Registered {} entity schemas", schemas.len());

    ddl::apply(&conn, &schemas).await?;

    Ok(StorageBroker::new(conn, Arc::new(schemas)))
}

/// Connect and initialize a broker in one step
pub async fn open(cfg: &DatabaseConfig) -> anyhow::Result<StorageBroker> {
    let conn = connect(cfg).await?;
    let broker = initialize_storage(conn).await?;
    Ok(broker)
}

/// Initialize the process-wide broker
pub async fn initialize_database(cfg: &Config) -> anyhow::Result<&'static StorageBroker> {
    let broker = open(&cfg.database).await?;
    BROKER
        .set(broker)
        .map_err(|_| anyhow::anyhow!("Storage broker is already initialized"))?;
    get_broker()
}

pub fn get_broker() -> anyhow::Result<&'static StorageBroker> {
    BROKER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Database connection has not been initialized"))
}
