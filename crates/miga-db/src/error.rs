//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                               │
//! │                                                                    │
//! │  SQLite Error (sqlx::Error)                                        │
//! │       │                                                            │
//! │       ▼                                                            │
//! │  DbError (this module) ← adds context and categorization           │
//! │       │                                                            │
//! │       ▼                                                            │
//! │  ApiError (in the API app) ← serialized for the frontend           │
//! └────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database (ownership-scoped misses included).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A supplied reference points at an entity the requester does not own.
    ///
    /// Distinct from [`DbError::NotFound`]: the target of the operation
    /// exists, one of its *references* is invalid.
    #[error("Invalid {entity} reference: {id}")]
    InvalidReference { entity: String, id: String },

    /// Unique constraint violation (duplicate tax id, sequence collision).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Sequence allocation kept colliding after the configured retries.
    #[error("Document number allocation failed after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an InvalidReference error.
    pub fn invalid_reference(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::InvalidReference {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether this error means a concurrent writer won the race for the
    /// same (owner, year) sequence and the allocation should be retried
    /// with a fresh read.
    ///
    /// Two shapes qualify:
    /// - the UNIQUE(user_id, year, sequence) index rejected the insert
    /// - SQLite reported a write-write conflict (`database is locked` /
    ///   busy snapshot) before the insert got that far
    pub fn is_allocation_conflict(&self) -> bool {
        match self {
            DbError::UniqueViolation { field, .. } => field.contains("sequence"),
            DbError::QueryFailed(msg) | DbError::Internal(msg) => {
                let msg = msg.to_ascii_lowercase();
                msg.contains("database is locked") || msg.contains("busy")
            }
            _ => false,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>, ..."
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
