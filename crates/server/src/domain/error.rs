use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Failures raised by identifiers, entities, the domain service and the
/// repository adapters. Messages are shown verbatim to the tool caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid {kind} ID format: {value}")]
    InvalidFormat { kind: &'static str, value: String },

    #[error("Database title cannot be empty")]
    EmptyTitle,

    #[error("{entity} is already archived")]
    AlreadyArchived { entity: &'static str },

    #[error("{entity} is not archived")]
    NotArchived { entity: &'static str },

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    #[error("Cannot duplicate page without parent database")]
    NoParentDatabase,

    #[error("Failed to {operation}: {message}")]
    RemoteRequestFailed { operation: &'static str, message: String },
}

impl DomainError {
    pub fn remote(operation: &'static str, message: impl ToString) -> Self {
        Self::RemoteRequestFailed { operation, message: message.to_string() }
    }
}
