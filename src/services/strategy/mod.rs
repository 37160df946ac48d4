//! Type-specific creation and join rules, dispatched by [`EventType`].

mod creator;
mod private;
mod public;
mod registry;

pub use creator::EventCreator;
pub use private::PrivateEventStrategy;
pub use public::PublicEventStrategy;
pub use registry::{EventStrategyRegistry, RegistryError};

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::{
    domain::{
        errors::{EventError, EventResult},
        models::{CreateEventRequest, Event, EventType, Membership, PhotoPayload},
        value_objects::AlcoholicId,
    },
    services::{EventValidator, MetadataStore},
};

/// How a join request reached the event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinChannel {
    /// Joined by event id
    Direct,
    /// Joined through the event's invitation link
    Invitation,
}

#[async_trait]
pub trait EventStrategy: Send + Sync + 'static {
    fn event_type(&self) -> EventType;

    /// Validate, insert and seed a new event. `main_image`, if present,
    /// becomes the main photo.
    async fn create(
        &self,
        request: &CreateEventRequest,
        creator: AlcoholicId,
        main_image: Option<PhotoPayload>,
    ) -> EventResult<Event>;

    /// Add `alcoholic_id` as a participant of `event`
    async fn join(
        &self,
        event: &Event,
        alcoholic_id: AlcoholicId,
        channel: JoinChannel,
    ) -> EventResult<Membership>;
}

/// Join rules shared by all event types: not a member yet, not banned and the
/// event has not ended.
pub(crate) async fn admit_member(
    validator: &EventValidator,
    metadata: &MetadataStore,
    event: &Event,
    alcoholic_id: AlcoholicId,
) -> EventResult<Membership> {
    validator
        .validate_not_already_participant(event.id, alcoholic_id)
        .await?;
    validator.validate_event_not_ended(event, Utc::now())?;

    let membership = Membership::new(event.id, alcoholic_id);
    if let Err(e) = metadata.save_membership(&membership).await {
        // Lost a race against a concurrent join of the same user
        if metadata
            .find_membership(event.id, alcoholic_id)
            .await?
            .is_some()
        {
            return Err(EventError::AlreadyMember {
                event_id: event.id,
                alcoholic_id,
            });
        }
        return Err(e);
    }

    info!(event_id = %event.id, alcoholic_id = %alcoholic_id, "Joined event");
    Ok(membership)
}
