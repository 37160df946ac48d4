use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::domain::{
    errors::ValidationError,
    value_objects::{AlcoholicId, EventId, InvitationLink, PhotoId},
};

/// Closed set of event kinds; each one has a registered strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Public,
    Private,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Public => "PUBLIC",
            EventType::Private => "PRIVATE",
        }
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PUBLIC" => Ok(EventType::Public),
            "PRIVATE" => Ok(EventType::Private),
            _ => Err(ValidationError::UnknownEventType(s.to_string())),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status derived from the event's time window; never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Scheduled,
    Active,
    Ended,
}

impl EventStatus {
    pub fn at(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < start {
            EventStatus::Scheduled
        } else if now <= end {
            EventStatus::Active
        } else {
            EventStatus::Ended
        }
    }
}

/// Immutable snapshot of an event row.
///
/// Only `main_photo_id` ever changes after creation. Writes go through the
/// repository's version check, which bumps `version` on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub info: String,
    pub event_type: EventType,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_by: AlcoholicId,
    pub main_photo_id: Option<PhotoId>,
    pub invitation_link: InvitationLink,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Build a fresh, unsaved event from a creation request
    pub fn from_request(
        request: &CreateEventRequest,
        created_by: AlcoholicId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::generate(),
            title: request.title.clone(),
            info: request.info.clone(),
            event_type: request.event_type,
            location: request.location.clone(),
            start_time: request.start_time,
            end_time: request.end_time,
            created_by,
            main_photo_id: None,
            invitation_link: InvitationLink::generate(),
            version: 0,
            created_at: now,
        }
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> EventStatus {
        EventStatus::at(self.start_time, self.end_time, now)
    }

    pub fn is_created_by(&self, alcoholic_id: AlcoholicId) -> bool {
        self.created_by == alcoholic_id
    }

    /// New snapshot pointing at another main photo. The version is left as is
    /// so the repository can check it against the stored row.
    pub fn with_main_photo(&self, main_photo_id: Option<PhotoId>) -> Event {
        Event {
            main_photo_id,
            ..self.clone()
        }
    }
}

/// Input for creating an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub info: String,
    pub event_type: EventType,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub invited: BTreeSet<AlcoholicId>,
}

/// Detail projection returned by `get_event`
#[derive(Debug, Clone, Serialize)]
pub struct EventDetails {
    pub event: Event,
    pub status: EventStatus,
    /// Ids of photos that are neither MAIN nor DELETED, oldest first
    pub photos: Vec<PhotoId>,
    /// Ids of non-banned participants
    pub participants: Vec<AlcoholicId>,
}

/// Row of an event listing
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub event: Event,
    pub status: EventStatus,
    pub is_participant: bool,
}
