// src/infrastructure/repositories/sqlite/migration.rs
use diesel::sqlite::Sqlite;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{debug, instrument};

use super::error::{SqliteRepositoryError, SqliteResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Runs all pending migrations and returns the names of those applied.
#[instrument(skip(connection), level = "debug")]
pub fn run_migrations(connection: &mut impl MigrationHarness<Sqlite>) -> SqliteResult<Vec<String>> {
    let pending = connection.pending_migrations(MIGRATIONS).map_err(|e| {
        SqliteRepositoryError::MigrationError(format!("Failed to check pending migrations: {}", e))
    })?;

    if pending.is_empty() {
        debug!("No pending migrations to run");
        return Ok(Vec::new());
    }

    let names: Vec<String> = pending.iter().map(|m| m.name().to_string()).collect();
    for name in &names {
        debug!("Pending Migration: {}", name);
    }

    connection.run_pending_migrations(MIGRATIONS).map_err(|e| {
        SqliteRepositoryError::MigrationError(format!("Failed to run pending migrations: {}", e))
    })?;

    Ok(names)
}
