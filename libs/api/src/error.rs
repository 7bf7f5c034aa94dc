//! Error types for portal API operations.

use std::fmt;

use portal_id::IdError;
use thiserror::Error;

/// Errors surfaced by [`Portal`](crate::Portal) implementations and the
/// request facade.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The addressed entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// An entity with the same ID already exists.
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// An argument is not acceptable for the operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// An identifier could not be created or parsed.
    #[error(transparent)]
    Id(#[from] IdError),
}

impl ApiError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        ApiError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn already_exists(entity: &'static str, id: impl fmt::Display) -> Self {
        ApiError::AlreadyExists {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true if this error reports a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Returns true if this error reports a duplicate entity.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ApiError::AlreadyExists { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ApiError::not_found("site", "site:classic");
        assert_eq!(err.to_string(), "site not found: site:classic");
        assert!(err.is_not_found());
        assert!(!err.is_already_exists());
    }

    #[test]
    fn test_id_error_is_transparent() {
        let inner = IdError::UnknownContext("nope".to_string());
        let err: ApiError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
    }
}
