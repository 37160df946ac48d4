use std::sync::Arc;

use crate::{
    domain::{
        errors::{Entity, EventError, EventResult},
        models::{Event, Membership, PageRequest, Photo, PhotoType},
        value_objects::{AlcoholicId, EventId, InvitationLink, MembershipId, PhotoId},
    },
    ports::repositories::{EventRepository, MembershipRepository, PhotoRepository},
};

/// Typed access to event, photo and membership rows.
///
/// Translates missing rows and storage failures into [`EventError`] so the
/// services never see raw repository errors.
#[derive(Clone)]
pub struct MetadataStore {
    events: Arc<dyn EventRepository>,
    photos: Arc<dyn PhotoRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

impl MetadataStore {
    pub fn new(
        events: Arc<dyn EventRepository>,
        photos: Arc<dyn PhotoRepository>,
        memberships: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            events,
            photos,
            memberships,
        }
    }

    // Events

    pub async fn insert_event(&self, event: &Event) -> EventResult<()> {
        Ok(self.events.insert_event(event).await?)
    }

    pub async fn get_event(&self, id: EventId) -> EventResult<Event> {
        self.events
            .get_event(&id)
            .await?
            .ok_or_else(|| EventError::not_found(Entity::Event, id))
    }

    /// Version-checked write; returns the snapshot with the new version
    pub async fn save_event(&self, event: &Event) -> EventResult<Event> {
        Ok(self.events.save_event(event).await?)
    }

    pub async fn delete_event(&self, id: EventId) -> EventResult<()> {
        if self.events.delete_event(&id).await? {
            Ok(())
        } else {
            Err(EventError::not_found(Entity::Event, id))
        }
    }

    pub async fn find_event_by_invitation(&self, link: InvitationLink) -> EventResult<Event> {
        self.events
            .find_event_by_invitation(&link)
            .await?
            .ok_or_else(|| EventError::not_found(Entity::Event, link))
    }

    pub async fn list_events_visible_to(
        &self,
        alcoholic_id: AlcoholicId,
        page: PageRequest,
    ) -> EventResult<(Vec<Event>, u64)> {
        let events = self
            .events
            .list_events_visible_to(&alcoholic_id, &page)
            .await?;
        let total = self.events.count_events_visible_to(&alcoholic_id).await?;
        Ok((events, total))
    }

    pub async fn list_events_joined_by(
        &self,
        alcoholic_id: AlcoholicId,
        page: PageRequest,
    ) -> EventResult<(Vec<Event>, u64)> {
        let events = self
            .events
            .list_events_joined_by(&alcoholic_id, &page)
            .await?;
        let total = self.events.count_events_joined_by(&alcoholic_id).await?;
        Ok((events, total))
    }

    // Photos

    pub async fn save_photo(&self, photo: &Photo) -> EventResult<()> {
        Ok(self.photos.save_photo(photo).await?)
    }

    pub async fn save_photos(&self, photos: &[Photo]) -> EventResult<()> {
        Ok(self.photos.save_photos(photos).await?)
    }

    pub async fn get_photo(&self, id: PhotoId) -> EventResult<Photo> {
        self.photos
            .get_photo(&id)
            .await?
            .ok_or_else(|| EventError::not_found(Entity::Photo, id))
    }

    pub async fn find_photo(&self, id: PhotoId) -> EventResult<Option<Photo>> {
        Ok(self.photos.get_photo(&id).await?)
    }

    pub async fn find_photos_by_event(
        &self,
        event_id: EventId,
        exclude: &[PhotoType],
    ) -> EventResult<Vec<Photo>> {
        Ok(self.photos.find_photos_by_event(&event_id, exclude).await?)
    }

    pub async fn find_oldest_photo_by_event(
        &self,
        event_id: EventId,
        exclude: &[PhotoType],
    ) -> EventResult<Option<Photo>> {
        Ok(self
            .photos
            .find_oldest_photo_by_event(&event_id, exclude)
            .await?)
    }

    /// Move `photo` to `to`, provided the state machine allows it and the
    /// stored row is still in the state the snapshot says
    pub async fn transition_photo(&self, photo: &Photo, to: PhotoType) -> EventResult<Photo> {
        let next = photo.transition(to)?;
        Ok(self
            .photos
            .transition_photo_type(&photo.id, photo.photo_type, next.photo_type)
            .await?)
    }

    // Memberships

    pub async fn find_membership(
        &self,
        event_id: EventId,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<Option<Membership>> {
        Ok(self
            .memberships
            .find_membership(&event_id, &alcoholic_id)
            .await?)
    }

    pub async fn save_membership(&self, membership: &Membership) -> EventResult<()> {
        Ok(self.memberships.save_membership(membership).await?)
    }

    pub async fn save_memberships(&self, memberships: &[Membership]) -> EventResult<()> {
        Ok(self.memberships.save_memberships(memberships).await?)
    }

    pub async fn delete_membership(&self, id: MembershipId) -> EventResult<()> {
        if self.memberships.delete_membership(&id).await? {
            Ok(())
        } else {
            Err(EventError::not_found(Entity::Membership, id))
        }
    }

    pub async fn list_memberships_by_event(&self, event_id: EventId) -> EventResult<Vec<Membership>> {
        Ok(self.memberships.list_memberships_by_event(&event_id).await?)
    }
}
