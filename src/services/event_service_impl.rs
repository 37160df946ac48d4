use async_trait::async_trait;
use chrono::Utc;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    domain::{
        errors::{Entity, EventError, EventResult, ValidationError},
        models::{
            CreateEventRequest, Event, EventDetails, EventStatus, EventSummary, Membership, Page,
            PageRequest, PhotoContent, PhotoPayload, PhotoType,
        },
        value_objects::{AlcoholicId, EventId, InvitationLink, PhotoId},
    },
    ports::services::{EventService, PhotoService},
    services::{
        strategy::{EventStrategyRegistry, JoinChannel},
        EventValidator, MetadataStore,
    },
};

/// Photos hidden from the detail projection
const DETAIL_EXCLUDED: [PhotoType; 2] = [PhotoType::Main, PhotoType::Deleted];

/// Implementation of EventService: sequences validation, strategy dispatch and
/// the photo lifecycle
#[derive(Clone)]
pub struct EventServiceImpl {
    registry: EventStrategyRegistry,
    metadata: MetadataStore,
    validator: EventValidator,
    photos: Arc<dyn PhotoService>,
}

impl EventServiceImpl {
    pub fn new(
        registry: EventStrategyRegistry,
        metadata: MetadataStore,
        validator: EventValidator,
        photos: Arc<dyn PhotoService>,
    ) -> Self {
        Self {
            registry,
            metadata,
            validator,
            photos,
        }
    }

    pub fn registry(&self) -> &EventStrategyRegistry {
        &self.registry
    }

    /// Checks shared by both join paths, after the event has been resolved
    async fn admit(
        &self,
        event: &Event,
        alcoholic_id: AlcoholicId,
        channel: JoinChannel,
    ) -> EventResult<Membership> {
        self.validator.validate_event_not_ended(event, Utc::now())?;
        if event.is_created_by(alcoholic_id) {
            return Err(EventError::CannotJoinOwnEvent { event_id: event.id });
        }
        let strategy = self.registry.get(event.event_type)?;
        strategy.join(event, alcoholic_id, channel).await
    }

    async fn details(&self, event: Event) -> EventResult<EventDetails> {
        let photos = self
            .metadata
            .find_photos_by_event(event.id, &DETAIL_EXCLUDED)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        let participants = self
            .metadata
            .list_memberships_by_event(event.id)
            .await?
            .into_iter()
            .filter(|m| !m.banned)
            .map(|m| m.alcoholic_id)
            .collect();

        Ok(EventDetails {
            status: event.status_at(Utc::now()),
            event,
            photos,
            participants,
        })
    }

    async fn summarize(
        &self,
        events: Vec<Event>,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<Vec<EventSummary>> {
        let now = Utc::now();
        try_join_all(events.into_iter().map(|event| async move {
            let is_participant = self
                .metadata
                .find_membership(event.id, alcoholic_id)
                .await?
                .is_some_and(|m| !m.banned);
            Ok::<_, EventError>(EventSummary {
                status: event.status_at(now),
                event,
                is_participant,
            })
        }))
        .await
    }

    async fn owned_event(&self, event_id: EventId, alcoholic_id: AlcoholicId) -> EventResult<Event> {
        let event = self.metadata.get_event(event_id).await?;
        self.validator.validate_is_owner(&event, alcoholic_id)?;
        Ok(event)
    }
}

#[async_trait]
impl EventService for EventServiceImpl {
    async fn create(
        &self,
        request: CreateEventRequest,
        creator: AlcoholicId,
        images: Vec<PhotoPayload>,
    ) -> EventResult<EventId> {
        self.validator.validate_photo_content_types(&images)?;
        let strategy = self.registry.get(request.event_type)?;

        let mut images = images.into_iter();
        let main_image = images.next();
        let event = strategy.create(&request, creator, main_image).await?;

        let rest: Vec<PhotoPayload> = images.collect();
        if !rest.is_empty() {
            self.photos
                .attach_photos(&event, rest, PhotoType::Active)
                .await?;
        }

        Ok(event.id)
    }

    async fn join(
        &self,
        event_id: EventId,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<Membership> {
        self.validator
            .validate_not_banned(event_id, alcoholic_id)
            .await?;
        let event = self.metadata.get_event(event_id).await?;
        self.admit(&event, alcoholic_id, JoinChannel::Direct).await
    }

    async fn join_by_invitation(
        &self,
        link: InvitationLink,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<Membership> {
        let event = self.metadata.find_event_by_invitation(link).await?;
        self.validator
            .validate_not_banned(event.id, alcoholic_id)
            .await?;
        self.admit(&event, alcoholic_id, JoinChannel::Invitation)
            .await
    }

    async fn leave(&self, event_id: EventId, alcoholic_id: AlcoholicId) -> EventResult<()> {
        let membership = self
            .validator
            .validate_is_participant(event_id, alcoholic_id)
            .await?;
        self.metadata.delete_membership(membership.id).await?;
        info!(event_id = %event_id, alcoholic_id = %alcoholic_id, "Left event");
        Ok(())
    }

    async fn disband(&self, event_id: EventId, alcoholic_id: AlcoholicId) -> EventResult<()> {
        self.owned_event(event_id, alcoholic_id).await?;
        self.metadata.delete_event(event_id).await?;
        info!(event_id = %event_id, alcoholic_id = %alcoholic_id, "Disbanded event");
        Ok(())
    }

    async fn get_event(
        &self,
        event_id: EventId,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<EventDetails> {
        // Banned users must not learn the event exists
        if let Some(membership) = self
            .metadata
            .find_membership(event_id, alcoholic_id)
            .await?
        {
            if membership.banned {
                return Err(EventError::not_found(Entity::Event, event_id));
            }
        }
        let event = self.metadata.get_event(event_id).await?;
        debug!(event_id = %event_id, alcoholic_id = %alcoholic_id, "Fetched event");
        self.details(event).await
    }

    async fn get_event_by_invitation(&self, link: InvitationLink) -> EventResult<EventDetails> {
        let event = self.metadata.find_event_by_invitation(link).await?;
        if event.status_at(Utc::now()) == EventStatus::Ended {
            return Err(EventError::not_found(Entity::Event, link));
        }
        self.details(event).await
    }

    async fn list_events(
        &self,
        alcoholic_id: AlcoholicId,
        page: PageRequest,
    ) -> EventResult<Page<EventSummary>> {
        let (events, total) = self
            .metadata
            .list_events_visible_to(alcoholic_id, page)
            .await?;
        let items = self.summarize(events, alcoholic_id).await?;
        debug!(alcoholic_id = %alcoholic_id, total, "Listed events");
        Ok(Page::new(items, page, total))
    }

    async fn list_events_joined_by(
        &self,
        alcoholic_id: AlcoholicId,
        page: PageRequest,
    ) -> EventResult<Page<EventSummary>> {
        let (events, total) = self
            .metadata
            .list_events_joined_by(alcoholic_id, page)
            .await?;
        let now = Utc::now();
        let items = events
            .into_iter()
            .map(|event| EventSummary {
                status: event.status_at(now),
                event,
                is_participant: true,
            })
            .collect();
        Ok(Page::new(items, page, total))
    }

    async fn add_photos(
        &self,
        event_id: EventId,
        alcoholic_id: AlcoholicId,
        photos: Vec<PhotoPayload>,
    ) -> EventResult<Vec<PhotoId>> {
        if photos.is_empty() {
            return Err(ValidationError::NoPhotos.into());
        }
        self.validator.validate_photo_content_types(&photos)?;
        let event = self.metadata.get_event(event_id).await?;
        self.validator
            .validate_is_participant(event_id, alcoholic_id)
            .await?;

        let attached = self
            .photos
            .attach_photos(&event, photos, PhotoType::Active)
            .await?;
        Ok(attached.into_iter().map(|p| p.id).collect())
    }

    async fn delete_photo(
        &self,
        event_id: EventId,
        photo_id: PhotoId,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<()> {
        let event = self.owned_event(event_id, alcoholic_id).await?;
        let photo = self.metadata.get_photo(photo_id).await?;
        if !photo.belongs_to(event.id) {
            return Err(EventError::not_found(Entity::Photo, photo_id));
        }
        self.photos.delete_photo(&event, &photo).await?;
        Ok(())
    }

    async fn set_main_photo(
        &self,
        event_id: EventId,
        photo_id: PhotoId,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<Event> {
        let event = self.owned_event(event_id, alcoholic_id).await?;
        self.photos.set_main_photo(&event, photo_id).await
    }

    async fn get_photo(&self, photo_id: PhotoId) -> EventResult<PhotoContent> {
        self.photos.read_photo(photo_id).await
    }
}
