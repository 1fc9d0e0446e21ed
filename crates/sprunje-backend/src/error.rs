use std::fmt;

/// Errors that occur during record storage operations (§7).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BackendError {
    /// Record not found by primary key within a given model's table.
    RecordNotFound { model: String, pk: String },
    /// A relation (relationship or detail) is not declared on the schema.
    RelationNotFound { model: String, relation: String },
    /// A unique constraint (declared `unique` validation, or a database
    /// constraint) was violated by the attempted write.
    Conflict { reason: String },
    /// A field the client tried to write is readonly, auto-increment, or computed.
    ReadOnly { field: String },
    /// The backend did not respond within its configured deadline.
    Timeout,
    /// Connection or transport-level error.
    ConnectionError { message: String },
    /// Query execution error (malformed SQL, unknown column, etc.).
    QueryError { message: String },
    /// Internal or unexpected error.
    Internal { message: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecordNotFound { model, pk } => {
                write!(f, "record '{pk}' not found in model '{model}'")
            }
            Self::RelationNotFound { model, relation } => {
                write!(f, "model '{model}' has no relation named '{relation}'")
            }
            Self::Conflict { reason } => write!(f, "conflict: {reason}"),
            Self::ReadOnly { field } => write!(f, "field '{field}' is readonly"),
            Self::Timeout => write!(f, "backend operation timed out"),
            Self::ConnectionError { message } => write!(f, "backend connection error: {message}"),
            Self::QueryError { message } => write!(f, "query execution error: {message}"),
            Self::Internal { message } => write!(f, "internal backend error: {message}"),
        }
    }
}

impl std::error::Error for BackendError {}
