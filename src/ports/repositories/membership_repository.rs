use crate::domain::{
    errors::StorageResult,
    models::Membership,
    value_objects::{AlcoholicId, EventId, MembershipId},
};
use async_trait::async_trait;

/// Repository for event memberships; one row per (event, alcoholic)
#[async_trait]
pub trait MembershipRepository: Send + Sync + 'static {
    async fn find_membership(
        &self,
        event_id: &EventId,
        alcoholic_id: &AlcoholicId,
    ) -> StorageResult<Option<Membership>>;

    /// Insert a membership; fails with `DuplicateRow` if the pair exists
    async fn save_membership(&self, membership: &Membership) -> StorageResult<()>;

    /// Insert all memberships or none of them
    async fn save_memberships(&self, memberships: &[Membership]) -> StorageResult<()>;

    /// Returns false if the row did not exist
    async fn delete_membership(&self, id: &MembershipId) -> StorageResult<bool>;

    /// All memberships of an event, banned rows included
    async fn list_memberships_by_event(&self, event_id: &EventId)
        -> StorageResult<Vec<Membership>>;
}
