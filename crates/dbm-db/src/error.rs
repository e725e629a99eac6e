//! Error types for dbm-db

use sqlx::error::DatabaseError;
use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed ({}): {message}", .code.as_deref().unwrap_or("no driver code"))]
    ExecutionError {
        /// Driver error code, when the driver exposes one
        code: Option<String>,
        message: String,
    },

    /// Catalog object has no readable definition (D003)
    #[error("[D003] No definition found for {kind} '{name}'")]
    DefinitionNotFound { kind: String, name: String },

    /// Not implemented (D004)
    #[error("[D004] Feature not implemented for {backend}: {feature}")]
    NotImplemented { backend: String, feature: String },

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Connection already closed (D006)
    #[error("[D006] Database connection is closed")]
    ConnectionClosed,
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Driver error code, if this error carries one.
    pub fn code(&self) -> Option<&str> {
        match self {
            DbError::ExecutionError { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn execution(message: impl Into<String>) -> Self {
        DbError::ExecutionError {
            code: None,
            message: message.into(),
        }
    }
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error only exposes the SQLite-compatible code for FFI
        // failures; everything else is message-only.
        let code = match &err {
            duckdb::Error::DuckDBFailure(ffi, _) => Some(format!("{:?}", ffi.code)),
            _ => None,
        };
        DbError::ExecutionError {
            code,
            message: err.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                // Prefer the MySQL error number (e.g. 1064) over the SQLSTATE.
                let code = db_err
                    .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
                    .map(|mysql| mysql.number().to_string())
                    .or_else(|| db_err.code().map(|c| c.into_owned()));
                DbError::ExecutionError {
                    code,
                    message: db_err.message().to_string(),
                }
            }
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut => {
                DbError::ConnectionError(err.to_string())
            }
            _ => DbError::execution(err.to_string()),
        }
    }
}
