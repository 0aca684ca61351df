//! Error types for the runbook library.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all runbook operations.
#[derive(Error, Debug)]
pub enum RunbookError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Task not found for the given ID
    #[error("Task with ID {id} not found")]
    TaskNotFound { id: u64 },
    /// Step not found for the given ID
    #[error("Step with ID {id} not found")]
    StepNotFound { id: u64 },
    /// Flow type has neither stored templates nor a built-in baseline
    #[error("Unknown flow type '{flow_type}'")]
    UnknownFlowType { flow_type: String },
    /// Another task is already being rolled out
    #[error("Task '{name}' (ID {id}) is already in progress; complete or pause it first")]
    ActiveTaskExists { id: u64, name: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Coarse classification used by transports to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> RunbookError {
        RunbookError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> RunbookError {
        RunbookError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl RunbookError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Classifies the error for transport layers (HTTP status, MCP error).
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunbookError::InvalidInput { .. } | RunbookError::UnknownFlowType { .. } => {
                ErrorKind::Validation
            }
            RunbookError::TaskNotFound { .. } | RunbookError::StepNotFound { .. } => {
                ErrorKind::NotFound
            }
            RunbookError::ActiveTaskExists { .. } => ErrorKind::Conflict,
            RunbookError::Database { .. }
            | RunbookError::FileSystem { .. }
            | RunbookError::XdgDirectory(_)
            | RunbookError::Serialization { .. }
            | RunbookError::Configuration { .. } => ErrorKind::Internal,
        }
    }

    /// Wraps a `spawn_blocking` join failure.
    pub(crate) fn join(error: tokio::task::JoinError) -> Self {
        RunbookError::Configuration {
            message: format!("Task join error: {error}"),
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| RunbookError::database(message).with_source(e))
    }
}

/// Result type alias for runbook operations
pub type Result<T> = std::result::Result<T, RunbookError>;
