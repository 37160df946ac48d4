use crate::domain::{
    models::PhotoType,
    value_objects::{EventId, ObjectId, PhotoId},
};

/// Errors reported by the repository and object store ports.
///
/// These never reach callers of the services directly; the façades translate
/// them into [`EventError`](super::EventError).
#[derive(Debug, Clone)]
pub enum StorageError {
    /// A row addressed by an update does not exist
    RowNotFound { table: &'static str, id: String },

    /// Optimistic version check on an event row lost the race
    VersionConflict {
        event_id: EventId,
        expected: i32,
        actual: Option<i32>,
    },

    /// Conditional photo type update found the row in a different state
    PhotoTypeConflict {
        photo_id: PhotoId,
        expected: PhotoType,
        actual: PhotoType,
        attempted: PhotoType,
    },

    /// A unique constraint would be violated
    DuplicateRow { table: &'static str, message: String },

    /// Payload missing from the object store
    ObjectNotFound { object_id: ObjectId },

    /// Infrastructure error with external source
    InfrastructureError {
        message: String,
        source: Option<String>, // Store error as string to allow Clone
    },

    /// Row could not be mapped back into a domain value
    InternalError { message: String },
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::RowNotFound { table, id } => {
                write!(f, "Row '{}' not found in table '{}'", id, table)
            }
            StorageError::VersionConflict {
                event_id,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Version conflict for event '{}': expected {}, actual {:?}",
                    event_id, expected, actual
                )
            }
            StorageError::PhotoTypeConflict {
                photo_id,
                expected,
                actual,
                attempted,
            } => {
                write!(
                    f,
                    "Photo '{}' is {} (expected {}) and cannot become {}",
                    photo_id, actual, expected, attempted
                )
            }
            StorageError::DuplicateRow { table, message } => {
                write!(f, "Duplicate row in table '{}': {}", table, message)
            }
            StorageError::ObjectNotFound { object_id } => {
                write!(f, "Object not found: {}", object_id)
            }
            StorageError::InfrastructureError { message, .. } => {
                write!(f, "Infrastructure error: {}", message)
            }
            StorageError::InternalError { message } => {
                write!(f, "Internal storage error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
