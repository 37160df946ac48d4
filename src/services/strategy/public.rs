use async_trait::async_trait;

use super::{admit_member, EventCreator, EventStrategy, JoinChannel};
use crate::{
    domain::{
        errors::EventResult,
        models::{CreateEventRequest, Event, EventType, Membership, PhotoPayload},
        value_objects::AlcoholicId,
    },
    services::{EventValidator, MetadataStore},
};

/// Anyone who is not banned may join
pub struct PublicEventStrategy {
    creator: EventCreator,
    validator: EventValidator,
    metadata: MetadataStore,
}

impl PublicEventStrategy {
    pub fn new(creator: EventCreator, validator: EventValidator, metadata: MetadataStore) -> Self {
        Self {
            creator,
            validator,
            metadata,
        }
    }
}

#[async_trait]
impl EventStrategy for PublicEventStrategy {
    fn event_type(&self) -> EventType {
        EventType::Public
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
        _channel: JoinChannel,
    ) -> EventResult<Membership> {
        admit_member(&self.validator, &self.metadata, event, alcoholic_id).await
    }
}
