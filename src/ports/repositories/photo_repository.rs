use crate::domain::{
    errors::StorageResult,
    models::{Photo, PhotoType},
    value_objects::{EventId, PhotoId},
};
use async_trait::async_trait;

/// Repository for photo metadata rows. Rows are never removed.
#[async_trait]
pub trait PhotoRepository: Send + Sync + 'static {
    /// Insert or replace a photo row
    async fn save_photo(&self, photo: &Photo) -> StorageResult<()>;

    /// Insert several photo rows at once
    async fn save_photos(&self, photos: &[Photo]) -> StorageResult<()>;

    async fn get_photo(&self, id: &PhotoId) -> StorageResult<Option<Photo>>;

    /// Photos of an event whose type is not in `exclude`, ordered by
    /// creation time then id
    async fn find_photos_by_event(
        &self,
        event_id: &EventId,
        exclude: &[PhotoType],
    ) -> StorageResult<Vec<Photo>>;

    /// First photo of `find_photos_by_event` for the same arguments
    async fn find_oldest_photo_by_event(
        &self,
        event_id: &EventId,
        exclude: &[PhotoType],
    ) -> StorageResult<Option<Photo>>;

    /// Set the type to `to` only if it is still `from`.
    ///
    /// Fails with `PhotoTypeConflict` when the stored type differs and with
    /// `RowNotFound` when the photo does not exist.
    async fn transition_photo_type(
        &self,
        id: &PhotoId,
        from: PhotoType,
        to: PhotoType,
    ) -> StorageResult<Photo>;
}
