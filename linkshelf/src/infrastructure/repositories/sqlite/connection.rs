use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::sqlite::SqliteConnection;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::error::{SqliteRepositoryError, SqliteResult};
use super::migration::run_migrations;

pub type ConnectionPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type PooledConnection = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

/// Applied to every pooled connection. The CLI and a running `watch` share one
/// database file, so writers wait for the lock instead of failing.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionCustomizer;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(
            "PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;",
        )
        .map_err(r2d2::Error::QueryError)
    }
}

/// Initialize a connection pool and bring the schema up to date
pub fn init_pool(database_url: &str) -> SqliteResult<ConnectionPool> {
    debug!("Initializing connection pool for: {}", database_url);

    if let Some(parent) = Path::new(database_url).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(SqliteRepositoryError::IoError)?;
        }
    }

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(4)
        .connection_timeout(Duration::from_secs(10))
        .connection_customizer(Box::new(ConnectionCustomizer))
        .build(manager)
        .map_err(|e| SqliteRepositoryError::ConnectionPoolError(e.to_string()))?;

    run_pending_migrations(&pool)?;

    info!("Connection pool initialized successfully");
    Ok(pool)
}

#[instrument(skip(pool), level = "info")]
pub fn run_pending_migrations(pool: &ConnectionPool) -> SqliteResult<()> {
    let mut conn = pool
        .get()
        .map_err(|e| SqliteRepositoryError::ConnectionPoolError(e.to_string()))?;

    for name in run_migrations(&mut conn)? {
        info!("Applied migration {}", name);
    }
    Ok(())
}
