use crate::domain::{
    errors::StorageResult,
    models::{Event, PageRequest},
    value_objects::{AlcoholicId, EventId, InvitationLink},
};
use async_trait::async_trait;

/// Repository for event rows
#[async_trait]
pub trait EventRepository: Send + Sync + 'static {
    /// Insert a new event; its version is stored as given
    async fn insert_event(&self, event: &Event) -> StorageResult<()>;

    /// Retrieve an event by id
    async fn get_event(&self, id: &EventId) -> StorageResult<Option<Event>>;

    /// Version-checked update.
    ///
    /// Succeeds only if the stored version still equals `event.version`, and
    /// returns the stored snapshot with the incremented version. Otherwise
    /// fails with `VersionConflict` (or `RowNotFound` if the row is gone).
    async fn save_event(&self, event: &Event) -> StorageResult<Event>;

    /// Delete an event and its memberships. Returns false if it did not exist.
    async fn delete_event(&self, id: &EventId) -> StorageResult<bool>;

    /// Resolve an invitation link to its event
    async fn find_event_by_invitation(
        &self,
        link: &InvitationLink,
    ) -> StorageResult<Option<Event>>;

    /// Events the alcoholic is not banned from, newest first
    async fn list_events_visible_to(
        &self,
        alcoholic_id: &AlcoholicId,
        page: &PageRequest,
    ) -> StorageResult<Vec<Event>>;

    async fn count_events_visible_to(&self, alcoholic_id: &AlcoholicId) -> StorageResult<u64>;

    /// Events the alcoholic is a non-banned member of, newest first
    async fn list_events_joined_by(
        &self,
        alcoholic_id: &AlcoholicId,
        page: &PageRequest,
    ) -> StorageResult<Vec<Event>>;

    async fn count_events_joined_by(&self, alcoholic_id: &AlcoholicId) -> StorageResult<u64>;
}
