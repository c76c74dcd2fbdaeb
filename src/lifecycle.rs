//! Shared failure taxonomy for the booking and document request
//! lifecycles.
//!
//! Every operation returns one of these as a value; nothing is retried
//! internally and nothing is swallowed. `PersistenceTimeout` is the
//! bounded-wait failure from a busy database and may be retried by the
//! caller with backoff.

use thiserror::Error;

use crate::db::DatabaseError;
use crate::storage::StorageError;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("record not found")]
    NotFound,

    #[error("record is already in a terminal state")]
    AlreadyTerminal,

    #[error("transition is not allowed from the current state")]
    InvalidTransition,

    #[error("persistence did not respond within the bounded timeout")]
    PersistenceTimeout,

    #[error("file storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("database error: {0}")]
    Database(DatabaseError),
}

impl From<DatabaseError> for LifecycleError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { .. } => LifecycleError::NotFound,
            DatabaseError::Timeout => LifecycleError::PersistenceTimeout,
            other => LifecycleError::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_not_found_maps_to_not_found() {
        let err: LifecycleError = DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: "x".into(),
        }
        .into();
        assert!(matches!(err, LifecycleError::NotFound));
    }

    #[test]
    fn db_timeout_maps_to_persistence_timeout() {
        let err: LifecycleError = DatabaseError::Timeout.into();
        assert!(matches!(err, LifecycleError::PersistenceTimeout));
    }

    #[test]
    fn validation_error_converts() {
        let err: LifecycleError = ValidationError::PastDate.into();
        assert!(matches!(
            err,
            LifecycleError::Validation(ValidationError::PastDate)
        ));
    }
}
