use std::{fmt::Display, sync::PoisonError};

/// Custom Result type for QuillDB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for QuillDB
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// No table with that name in the catalog
    TableNotFound(String),
    /// CREATE TABLE on a name that is already taken
    TableAlreadyExists(String),
    /// Column name did not resolve against the table or result header
    ColumnNotFound(String),
    /// Value cannot be coerced to the column type, or comparison operands disagree
    TypeMismatch(String),
    /// Operator not defined for the operand type (e.g. `<` on strings)
    UnsupportedOperator(String),
    /// Malformed statement
    Syntax(String),
    /// BEGIN while a transaction is open, COMMIT/ROLLBACK while idle
    TransactionState(String),
    /// Record I/O or (de)serialization failure
    Persistence(String),
    /// Internal error (lock poisoning)
    Internal(String),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Persistence(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Persistence(value.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(value: tempfile::PersistError) -> Self {
        Error::Persistence(value.to_string())
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(value: PoisonError<T>) -> Self {
        Error::Internal(value.to_string())
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TableNotFound(name) => write!(f, "table {} does not exist", name),
            Error::TableAlreadyExists(name) => write!(f, "table {} already exists", name),
            Error::ColumnNotFound(name) => write!(f, "column {} not found", name),
            Error::TypeMismatch(err) => write!(f, "type mismatch: {}", err),
            Error::UnsupportedOperator(err) => write!(f, "unsupported operator: {}", err),
            Error::Syntax(err) => write!(f, "syntax error: {}", err),
            Error::TransactionState(err) => write!(f, "transaction error: {}", err),
            Error::Persistence(err) => write!(f, "persistence error: {}", err),
            Error::Internal(err) => write!(f, "internal error: {}", err),
        }
    }
}
