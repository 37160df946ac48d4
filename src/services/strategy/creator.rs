use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use crate::{
    domain::{
        errors::EventResult,
        models::{CreateEventRequest, Event, Membership, PhotoPayload, PhotoType},
        value_objects::AlcoholicId,
    },
    ports::services::PhotoService,
    services::{EventValidator, MetadataStore},
};

/// Creation steps shared by every event type
#[derive(Clone)]
pub struct EventCreator {
    metadata: MetadataStore,
    validator: EventValidator,
    photos: Arc<dyn PhotoService>,
}

impl EventCreator {
    pub fn new(
        metadata: MetadataStore,
        validator: EventValidator,
        photos: Arc<dyn PhotoService>,
    ) -> Self {
        Self {
            metadata,
            validator,
            photos,
        }
    }

    /// Insert the event, attach its main image and seed memberships for the
    /// creator and everyone invited
    pub async fn create(
        &self,
        request: &CreateEventRequest,
        creator: AlcoholicId,
        main_image: Option<PhotoPayload>,
    ) -> EventResult<Event> {
        let now = Utc::now();
        self.validator.validate_title(&request.title)?;
        self.validator
            .validate_dates(request.start_time, request.end_time, now)?;

        let mut event = Event::from_request(request, creator, now);
        self.metadata.insert_event(&event).await?;

        if let Some(image) = main_image {
            let attached = self
                .photos
                .attach_photos(&event, vec![image], PhotoType::Main)
                .await?;
            if let Some(main) = attached.first() {
                event = self
                    .metadata
                    .save_event(&event.with_main_photo(Some(main.id)))
                    .await?;
            }
        }

        let mut participants: BTreeSet<AlcoholicId> = request.invited.clone();
        participants.insert(creator);
        let memberships: Vec<Membership> = participants
            .into_iter()
            .map(|alcoholic_id| Membership::new(event.id, alcoholic_id))
            .collect();
        self.metadata.save_memberships(&memberships).await?;

        info!(
            event_id = %event.id,
            event_type = %event.event_type,
            created_by = %creator,
            participants = memberships.len(),
            "Created event"
        );
        Ok(event)
    }
}
