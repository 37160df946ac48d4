use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::{
    errors::{EventError, EventResult, ValidationError},
    value_objects::{EventId, ObjectId, PhotoId},
};

/// State tag of a photo row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhotoType {
    Active,
    Main,
    Ended,
    Deleted,
}

impl PhotoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoType::Active => "ACTIVE",
            PhotoType::Main => "MAIN",
            PhotoType::Ended => "ENDED",
            PhotoType::Deleted => "DELETED",
        }
    }

    /// Allowed edges of the photo state machine
    pub fn can_transition_to(&self, next: PhotoType) -> bool {
        matches!(
            (self, next),
            (PhotoType::Active, PhotoType::Main)
                | (PhotoType::Main, PhotoType::Active)
                | (
                    PhotoType::Active | PhotoType::Main | PhotoType::Ended,
                    PhotoType::Deleted
                )
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PhotoType::Deleted)
    }
}

impl FromStr for PhotoType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(PhotoType::Active),
            "MAIN" => Ok(PhotoType::Main),
            "ENDED" => Ok(PhotoType::Ended),
            "DELETED" => Ok(PhotoType::Deleted),
            _ => Err(ValidationError::UnknownPhotoType(s.to_string())),
        }
    }
}

impl std::fmt::Display for PhotoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata of a photo attached to an event. The payload lives in the
/// object store under `object_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    pub event_id: EventId,
    pub object_id: ObjectId,
    pub photo_type: PhotoType,
    pub created_at: DateTime<Utc>,
}

impl Photo {
    pub fn new(
        event_id: EventId,
        object_id: ObjectId,
        photo_type: PhotoType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PhotoId::generate(),
            event_id,
            object_id,
            photo_type,
            created_at,
        }
    }

    /// Snapshot of this photo in state `next`, if the state machine allows it
    pub fn transition(&self, next: PhotoType) -> EventResult<Photo> {
        if !self.photo_type.can_transition_to(next) {
            return Err(EventError::InvalidStateTransition {
                photo_id: self.id,
                from: self.photo_type,
                to: next,
            });
        }
        Ok(Photo {
            photo_type: next,
            ..self.clone()
        })
    }

    pub fn belongs_to(&self, event_id: EventId) -> bool {
        self.event_id == event_id
    }
}

/// Uploaded photo content, before it is stored
#[derive(Debug, Clone)]
pub struct PhotoPayload {
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl PhotoPayload {
    pub fn new(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            data: data.into(),
        }
    }
}

/// Stored photo content as returned by `read_photo`
#[derive(Debug, Clone)]
pub struct PhotoContent {
    pub photo_id: PhotoId,
    pub content_type: String,
    pub data: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(photo_type: PhotoType) -> Photo {
        Photo::new(
            EventId::generate(),
            ObjectId::generate(),
            photo_type,
            Utc::now(),
        )
    }

    #[test]
    fn test_allowed_transitions() {
        assert!(PhotoType::Active.can_transition_to(PhotoType::Main));
        assert!(PhotoType::Main.can_transition_to(PhotoType::Active));
        assert!(PhotoType::Ended.can_transition_to(PhotoType::Deleted));
        assert!(PhotoType::Main.can_transition_to(PhotoType::Deleted));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!PhotoType::Ended.can_transition_to(PhotoType::Main));
        assert!(!PhotoType::Active.can_transition_to(PhotoType::Ended));
        assert!(!PhotoType::Main.can_transition_to(PhotoType::Main));
        for next in [
            PhotoType::Active,
            PhotoType::Main,
            PhotoType::Ended,
            PhotoType::Deleted,
        ] {
            assert!(!PhotoType::Deleted.can_transition_to(next));
        }
    }

    #[test]
    fn test_transition_returns_new_snapshot() {
        let original = photo(PhotoType::Active);
        let promoted = original.transition(PhotoType::Main).unwrap();

        assert_eq!(promoted.photo_type, PhotoType::Main);
        assert_eq!(promoted.id, original.id);
        assert_eq!(original.photo_type, PhotoType::Active);
    }

    #[test]
    fn test_deleted_is_terminal() {
        let deleted = photo(PhotoType::Deleted);
        let err = deleted.transition(PhotoType::Deleted).unwrap_err();
        assert!(matches!(
            err,
            EventError::InvalidStateTransition {
                from: PhotoType::Deleted,
                to: PhotoType::Deleted,
                ..
            }
        ));
        assert!(PhotoType::Deleted.is_terminal());
    }
}
