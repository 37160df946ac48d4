use async_trait::async_trait;

use crate::domain::{
    errors::EventResult,
    models::{
        CreateEventRequest, Event, EventDetails, EventSummary, Membership, Page, PageRequest,
        PhotoContent, PhotoPayload,
    },
    value_objects::{AlcoholicId, EventId, InvitationLink, PhotoId},
};

/// Top-level event use cases.
///
/// Every operation validates its inputs completely before the first write.
#[async_trait]
pub trait EventService: Send + Sync + 'static {
    /// Create an event. The first image becomes the main photo, the rest are
    /// attached as regular photos.
    async fn create(
        &self,
        request: CreateEventRequest,
        creator: AlcoholicId,
        images: Vec<PhotoPayload>,
    ) -> EventResult<EventId>;

    async fn join(&self, event_id: EventId, alcoholic_id: AlcoholicId)
        -> EventResult<Membership>;

    /// Join through an invitation link; the only way into a private event
    async fn join_by_invitation(
        &self,
        link: InvitationLink,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<Membership>;

    async fn leave(&self, event_id: EventId, alcoholic_id: AlcoholicId) -> EventResult<()>;

    /// Delete an event and its memberships. Creator only.
    async fn disband(&self, event_id: EventId, alcoholic_id: AlcoholicId) -> EventResult<()>;

    async fn get_event(
        &self,
        event_id: EventId,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<EventDetails>;

    /// Resolve an invitation link to an event that has not ended
    async fn get_event_by_invitation(&self, link: InvitationLink) -> EventResult<EventDetails>;

    /// Events the alcoholic is not banned from
    async fn list_events(
        &self,
        alcoholic_id: AlcoholicId,
        page: PageRequest,
    ) -> EventResult<Page<EventSummary>>;

    /// Events the alcoholic participates in
    async fn list_events_joined_by(
        &self,
        alcoholic_id: AlcoholicId,
        page: PageRequest,
    ) -> EventResult<Page<EventSummary>>;

    async fn add_photos(
        &self,
        event_id: EventId,
        alcoholic_id: AlcoholicId,
        photos: Vec<PhotoPayload>,
    ) -> EventResult<Vec<PhotoId>>;

    async fn delete_photo(
        &self,
        event_id: EventId,
        photo_id: PhotoId,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<()>;

    async fn set_main_photo(
        &self,
        event_id: EventId,
        photo_id: PhotoId,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<Event>;

    async fn get_photo(&self, photo_id: PhotoId) -> EventResult<PhotoContent>;
}
