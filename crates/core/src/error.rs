//! Error taxonomy shared by the banking and treasury domains.
//!
//! Each domain has its own closed error enum; every variant maps onto one
//! [`ErrorKind`], which is what callers (and the HTTP layer) branch on.

use tally_shared::AppError;
use thiserror::Error;

/// Coarse classification of every domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The entity does not exist.
    NotFound,
    /// A unique field (email, tax identifier, code) is already taken.
    AlreadyExists,
    /// The operation is not permitted from the current lifecycle state.
    InvalidState,
    /// Not enough balance (or other resource) to complete the operation.
    InsufficientResource,
    /// The request itself is malformed (non-positive amount, bad rate, bad period).
    InvalidInput,
    /// The stored record changed since it was loaded.
    Conflict,
    /// The backing store failed.
    Storage,
}

/// Errors raised by repository implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// No record with the given id.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// A unique field collides with an existing record.
    #[error("{entity} with {field} '{value}' already exists")]
    Duplicate {
        /// Entity name.
        entity: &'static str,
        /// Name of the unique field.
        field: &'static str,
        /// The colliding value.
        value: String,
    },

    /// Optimistic concurrency check failed.
    #[error("{entity} {id} was modified concurrently")]
    Conflict {
        /// Entity name.
        entity: &'static str,
        /// Identifier of the record.
        id: String,
    },

    /// Any other storage failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    /// Builds a `NotFound` error for any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Duplicate { .. } => ErrorKind::AlreadyExists,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Converts a domain error into the application-wide error by kind.
pub(crate) fn to_app_error(kind: ErrorKind, message: String) -> AppError {
    match kind {
        ErrorKind::NotFound => AppError::NotFound(message),
        ErrorKind::AlreadyExists | ErrorKind::Conflict => AppError::Conflict(message),
        ErrorKind::InvalidState => AppError::BusinessRule(message),
        ErrorKind::InsufficientResource => AppError::InsufficientFunds(message),
        ErrorKind::InvalidInput => AppError::Validation(message),
        ErrorKind::Storage => AppError::Database(message),
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        to_app_error(err.kind(), err.to_string())
    }
}
