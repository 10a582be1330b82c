use std::{error::Error, sync::Arc};

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Result type used throughout the adapter.
pub type Result<T, E = AdapterError> = std::result::Result<T, E>;

/// Every failure the adapter can report.
///
/// The type is `Clone` so the adapter can keep a copy as its last error while
/// handing the original back to the caller.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum AdapterError {
    /// Malformed dialect text or a reference to an unknown column.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Dialect(#[from] DialectError),

    /// The entity schema is malformed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    /// The request was rejected before any SQL was issued.
    #[error("Validation failed: {0}")]
    #[diagnostic(code(ice::validation))]
    Validation(String),

    /// A result value could not be assigned to an entity field.
    #[error("Cannot hydrate field `{field}`: {source}")]
    #[diagnostic(code(ice::hydration))]
    Hydration {
        field: String,
        #[source]
        source: ConversionError,
    },

    /// The database reported a failure.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    /// The connection does not provide the requested operation.
    #[error("Operation not supported by this connection: {0}")]
    #[diagnostic(
        code(ice::unsupported),
        help("use a connection that implements raw and batch execution, such as SqliteConnection")
    )]
    Unsupported(&'static str),
}

impl AdapterError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the failure happened before the database was touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Dialect(_) | Self::Schema(_) | Self::Validation(_)
        )
    }
}

/// A lexing, parsing or allowlist failure in a dialect fragment.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(ice::dialect))]
pub struct DialectError {
    pub message: String,

    #[source_code]
    pub src: String,

    #[label("here")]
    pub span: SourceSpan,
}

impl DialectError {
    pub(crate) fn new(message: impl Into<String>, src: &str, offset: usize, len: usize) -> Self {
        Self {
            message: message.into(),
            src: src.to_owned(),
            span: (offset, len).into(),
        }
    }
}

/// Configuration errors raised while a schema is being built.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SchemaError {
    #[error("Table name must not be empty")]
    #[diagnostic(code(ice::schema::empty_table))]
    EmptyTable,

    #[error("`{0}` is not a valid SQL identifier")]
    #[diagnostic(code(ice::schema::identifier))]
    InvalidIdentifier(String),

    #[error("Table `{table}` maps column `{column}` more than once")]
    #[diagnostic(code(ice::schema::duplicate_column))]
    DuplicateColumn { table: String, column: String },

    #[error("Table `{table}` declares field `{field}` more than once")]
    #[diagnostic(code(ice::schema::duplicate_field))]
    DuplicateField { table: String, field: String },

    #[error("Table `{table}` has no primary key")]
    #[diagnostic(code(ice::schema::missing_key))]
    MissingKey { table: String },

    #[error("Key column `{key}` is not mapped by table `{table}`")]
    #[diagnostic(code(ice::schema::unknown_key))]
    UnknownKey { table: String, key: String },
}

/// A value of the wrong type was assigned to a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct ConversionError {
    pub expected: &'static str,
    pub found: &'static str,
}

/// A failure reported by the underlying database connection.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("Database error: {message}")]
#[diagnostic(code(ice::database))]
pub struct DatabaseError {
    pub message: String,

    #[source]
    cause: Option<Arc<dyn Error + Send + Sync>>,
}

impl DatabaseError {
    /// Wraps a driver error, keeping it as the source.
    pub fn new<E: Error + Send + Sync + 'static>(cause: E) -> Self {
        Self {
            message: cause.to_string(),
            cause: Some(Arc::new(cause)),
        }
    }

    /// A failure with no underlying driver error.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// The driver error this failure was built from, if any.
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_keeps_source() {
        let io = std::io::Error::other("disk on fire");
        let err = AdapterError::from(DatabaseError::new(io));

        assert!(!err.is_validation());
        assert!(err.to_string().contains("disk on fire"));
        let AdapterError::Database(db) = &err else {
            panic!("Expected database error");
        };
        assert!(db.cause().is_some());
    }

    #[test]
    fn test_clone_preserves_message() {
        let err = AdapterError::validation("pageSize must not be negative");
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
        assert!(copy.is_validation());
    }

    #[test]
    fn test_dialect_error_span() {
        let err = DialectError::new("Unknown column `agee`", "agee > 18", 0, 4);
        assert_eq!(err.span.offset(), 0);
        assert_eq!(err.span.len(), 4);
        assert_eq!(err.src, "agee > 18");
    }
}
