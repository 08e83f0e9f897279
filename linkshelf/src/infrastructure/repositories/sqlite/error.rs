// src/infrastructure/repositories/sqlite/error.rs

use diesel::r2d2;
use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::domain::error::DomainError;

#[derive(Error, Debug)]
pub enum SqliteRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DieselError),

    #[error("Connection pool error: {0}")]
    ConnectionPoolError(String),

    #[error("Failed to convert entity: {0}")]
    ConversionError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

pub type SqliteResult<T> = Result<T, SqliteRepositoryError>;

impl From<r2d2::Error> for SqliteRepositoryError {
    fn from(err: r2d2::Error) -> Self {
        SqliteRepositoryError::ConnectionPoolError(err.to_string())
    }
}

/// Everything the database reports surfaces as a store error
impl From<SqliteRepositoryError> for DomainError {
    fn from(err: SqliteRepositoryError) -> Self {
        match err {
            SqliteRepositoryError::DatabaseError(DieselError::DatabaseError(_, info)) => {
                DomainError::Store(format!("Database error: {}", info.message()))
            }
            SqliteRepositoryError::IoError(e) => DomainError::Io(e),
            other => DomainError::Store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_pool_error_when_converted_then_store_error() {
        let err: DomainError = SqliteRepositoryError::ConnectionPoolError("timed out".into()).into();
        assert!(matches!(err, DomainError::Store(msg) if msg.contains("timed out")));
    }

    #[test]
    fn given_not_found_when_converted_then_store_error() {
        let err: DomainError = SqliteRepositoryError::DatabaseError(DieselError::NotFound).into();
        assert!(matches!(err, DomainError::Store(_)));
    }
}
