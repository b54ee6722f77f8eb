//! Repository Module
//!
//! Free async functions over `&SqlitePool` for plain CRUD. Workflow steps
//! that must share a transaction take `&mut SqliteConnection` (`&mut *tx`).

// Auth
pub mod user;

// HR
pub mod applicant;
pub mod client;
pub mod employee;
pub mod job;

// Stock
pub mod request;
pub mod stock;

// Assets
pub mod asset;
pub mod asset_request;

// Aquaculture
pub mod cage;
pub mod feeding;
pub mod medication;
pub mod medicine;
pub mod pond;

use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation with a domain error code
    #[error("{1}")]
    Rule(ErrorCode, String),
}

impl RepoError {
    pub fn rule(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Rule(code, message.into())
    }

    /// Turn a unique-constraint violation into a domain error code
    pub fn duplicate_as(self, code: ErrorCode, message: impl Into<String>) -> Self {
        match self {
            Self::Duplicate(_) => Self::Rule(code, message.into()),
            other => other,
        }
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                RepoError::Validation("Referenced record does not exist".into())
            }
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                RepoError::Validation(format!("Constraint failed: {}", db_err.message()))
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Database operation failed");
                AppError::database("Database operation failed")
            }
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Rule(code, msg) => AppError::with_message(code, msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Workflow transaction; `&mut tx` derefs to `&mut SqliteConnection`
pub type Tx = sqlx::Transaction<'static, sqlx::Sqlite>;

pub async fn begin(pool: &sqlx::SqlitePool) -> RepoResult<Tx> {
    Ok(pool.begin().await?)
}

pub async fn commit(tx: Tx) -> RepoResult<()> {
    Ok(tx.commit().await?)
}

/// `ORDER BY` + `LIMIT` 的默认上限
pub const DEFAULT_LIST_LIMIT: i64 = 500;

/// `%term%` for LIKE searches
pub(crate) fn like_pattern(term: &str) -> String {
    format!("%{}%", term.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_error_to_app_error() {
        let err: AppError = RepoError::NotFound("Cage 1 not found".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: AppError = RepoError::Duplicate("UNIQUE".into())
            .duplicate_as(ErrorCode::CageCodeExists, "Cage code already exists")
            .into();
        assert_eq!(err.code, ErrorCode::CageCodeExists);
        assert_eq!(err.http_status(), http::StatusCode::CONFLICT);

        let err: AppError = RepoError::rule(ErrorCode::StockInsufficient, "not enough").into();
        assert_eq!(err.code, ErrorCode::StockInsufficient);

        let err: AppError = RepoError::Database("disk I/O".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("disk"));
    }
}
