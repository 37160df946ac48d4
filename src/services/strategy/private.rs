use async_trait::async_trait;
use tracing::debug;

use super::{admit_member, EventCreator, EventStrategy, JoinChannel};
use crate::{
    domain::{
        errors::{EventError, EventResult},
        models::{CreateEventRequest, Event, EventType, Membership, PhotoPayload},
        value_objects::AlcoholicId,
    },
    services::{EventValidator, MetadataStore},
};

/// Only reachable through the invitation link
pub struct PrivateEventStrategy {
    creator: EventCreator,
    validator: EventValidator,
    metadata: MetadataStore,
}

impl PrivateEventStrategy {
    pub fn new(creator: EventCreator, validator: EventValidator, metadata: MetadataStore) -> Self {
        Self {
            creator,
            validator,
            metadata,
        }
    }
}

#[async_trait]
impl EventStrategy for PrivateEventStrategy {
    fn event_type(&self) -> EventType {
        EventType::Private
    }

    async fn create(
        &self,
        request: &CreateEventRequest,
        creator: AlcoholicId,
        main_image: Option<PhotoPayload>,
    ) -> EventResult<Event> {
        self.creator.create(request, creator, main_image).await
    }

    async fn join(
        &self,
        event: &Event,
        alcoholic_id: AlcoholicId,
        channel: JoinChannel,
    ) -> EventResult<Membership> {
        if channel != JoinChannel::Invitation {
            debug!(event_id = %event.id, alcoholic_id = %alcoholic_id, "Rejected direct join");
            return Err(EventError::InvitationRequired { event_id: event.id });
        }
        admit_member(&self.validator, &self.metadata, event, alcoholic_id).await
    }
}
