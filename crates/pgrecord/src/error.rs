//! Error types for pgrecord

use thiserror::Error;

/// Result type alias for pgrecord operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for statement compilation and record operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// SELECT compiled without a bound table
    #[error("SELECT has no FROM clause; call from() before compiling")]
    MissingFromClause,

    /// INSERT compiled with zero value rows, or a first row with no columns
    #[error("INSERT into \"{0}\" has no values to insert")]
    NoValuesToInsert(String),

    /// UPDATE compiled with an empty SET clause
    #[error("UPDATE of \"{0}\" has no columns to set")]
    NoColumnsToUpdate(String),

    /// Identity operation on a table without exactly one primary-key column
    #[error("No usable primary key: {0}")]
    NoPrimaryKey(String),

    /// Reload found zero rows for the record's primary key
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// INSERT ... RETURNING produced zero rows during create
    #[error("Insert into \"{0}\" returned no rows")]
    InsertFailed(String),

    /// Builder misuse detected at compile time (e.g. heterogeneous insert rows)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Gateway-reported error, passed through untranslated
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound(_))
    }

    /// Check if this is a compile-time structural error
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MissingFromClause
                | Self::NoValuesToInsert(_)
                | Self::NoColumnsToUpdate(_)
                | Self::Validation(_)
        )
    }
}
