use async_trait::async_trait;

use crate::domain::{
    errors::EventResult,
    models::{Event, Photo, PhotoContent, PhotoPayload, PhotoType},
    value_objects::PhotoId,
};

/// Photo state machine and main photo bookkeeping.
///
/// Callers pass the event snapshot they read. Every change to the main photo
/// pointer is written with that snapshot's version, so a stale snapshot fails
/// with `VersionConflict` before any photo row is touched.
#[async_trait]
pub trait PhotoService: Send + Sync + 'static {
    /// Make `photo_id` the main photo of `event`, demoting the current one
    async fn set_main_photo(&self, event: &Event, photo_id: PhotoId) -> EventResult<Event>;

    /// Mark a photo DELETED, promoting the oldest remaining photo if it was
    /// the main one
    async fn delete_photo(&self, event: &Event, photo: &Photo) -> EventResult<Event>;

    /// Store payloads and create their rows. The first one gets
    /// `role_for_first`, the rest are ACTIVE. The event pointer is untouched.
    async fn attach_photos(
        &self,
        event: &Event,
        payloads: Vec<PhotoPayload>,
        role_for_first: PhotoType,
    ) -> EventResult<Vec<Photo>>;

    /// Content of a photo that is not DELETED
    async fn read_photo(&self, photo_id: PhotoId) -> EventResult<PhotoContent>;
}
