use thiserror::Error;

use super::{StorageError, ValidationError};
use crate::domain::{
    models::{EventType, PhotoType},
    value_objects::{AlcoholicId, EventId, PhotoId},
};

/// Kind of entity a `NotFound` error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Event,
    Photo,
    Membership,
    PhotoContent,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Entity::Event => "event",
            Entity::Photo => "photo",
            Entity::Membership => "membership",
            Entity::PhotoContent => "photo content",
        };
        f.write_str(name)
    }
}

/// Errors returned by the event and photo services
#[derive(Debug, Clone, Error)]
pub enum EventError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("alcoholic {alcoholic_id} is not allowed to modify event {event_id}")]
    PermissionDenied {
        event_id: EventId,
        alcoholic_id: AlcoholicId,
    },

    #[error("alcoholic {alcoholic_id} already participates in event {event_id}")]
    AlreadyMember {
        event_id: EventId,
        alcoholic_id: AlcoholicId,
    },

    #[error("alcoholic {alcoholic_id} is banned from event {event_id}")]
    Banned {
        event_id: EventId,
        alcoholic_id: AlcoholicId,
    },

    #[error("cannot join own event {event_id}")]
    CannotJoinOwnEvent { event_id: EventId },

    #[error("event {event_id} has already ended")]
    EventEnded { event_id: EventId },

    #[error("event {event_id} can only be joined through its invitation link")]
    InvitationRequired { event_id: EventId },

    #[error("photo {photo_id} cannot move from {from} to {to}")]
    InvalidStateTransition {
        photo_id: PhotoId,
        from: PhotoType,
        to: PhotoType,
    },

    #[error("event {event_id} was modified concurrently (expected version {expected})")]
    VersionConflict { event_id: EventId, expected: i32 },

    #[error("event type {event_type} is not supported")]
    UnsupportedEventType { event_type: EventType },

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl EventError {
    pub fn not_found(entity: Entity, id: impl ToString) -> Self {
        EventError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn membership_not_found(event_id: EventId, alcoholic_id: AlcoholicId) -> Self {
        Self::not_found(Entity::Membership, format!("{}/{}", event_id, alcoholic_id))
    }

    /// True for failures caused by infrastructure rather than by the caller
    pub fn is_internal(&self) -> bool {
        matches!(self, EventError::Storage { .. })
    }
}

impl From<StorageError> for EventError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::VersionConflict {
                event_id, expected, ..
            } => EventError::VersionConflict { event_id, expected },
            StorageError::PhotoTypeConflict {
                photo_id,
                actual,
                attempted,
                ..
            } => EventError::InvalidStateTransition {
                photo_id,
                from: actual,
                to: attempted,
            },
            StorageError::RowNotFound { table, id } => {
                let entity = match table {
                    "event" => Entity::Event,
                    "event_alcoholic" => Entity::Membership,
                    _ => Entity::Photo,
                };
                EventError::NotFound { entity, id }
            }
            StorageError::ObjectNotFound { object_id } => {
                EventError::not_found(Entity::PhotoContent, object_id)
            }
            other => EventError::Storage {
                message: other.to_string(),
            },
        }
    }
}

/// Result type for event operations
pub type EventResult<T> = Result<T, EventError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ObjectId;

    #[test]
    fn test_version_conflict_maps_through() {
        let event_id = EventId::generate();
        let err: EventError = StorageError::VersionConflict {
            event_id,
            expected: 3,
            actual: Some(4),
        }
        .into();
        assert!(matches!(
            err,
            EventError::VersionConflict { expected: 3, .. }
        ));
    }

    #[test]
    fn test_photo_type_conflict_reports_actual_state() {
        let photo_id = PhotoId::generate();
        let err: EventError = StorageError::PhotoTypeConflict {
            photo_id,
            expected: PhotoType::Active,
            actual: PhotoType::Deleted,
            attempted: PhotoType::Deleted,
        }
        .into();
        match err {
            EventError::InvalidStateTransition { from, to, .. } => {
                assert_eq!(from, PhotoType::Deleted);
                assert_eq!(to, PhotoType::Deleted);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_object_is_not_found() {
        let err: EventError = StorageError::ObjectNotFound {
            object_id: ObjectId::generate(),
        }
        .into();
        assert!(matches!(
            err,
            EventError::NotFound {
                entity: Entity::PhotoContent,
                ..
            }
        ));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_infrastructure_errors_are_internal() {
        let err: EventError = StorageError::InfrastructureError {
            message: "connection reset".to_string(),
            source: None,
        }
        .into();
        assert!(err.is_internal());
    }
}
