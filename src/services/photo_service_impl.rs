use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        errors::{Entity, EventError, EventResult, ValidationError},
        models::{Event, Photo, PhotoContent, PhotoPayload, PhotoType},
        value_objects::{EventId, ObjectId, PhotoId},
    },
    ports::services::PhotoService,
    services::{MetadataStore, PhotoStorage},
};

/// Photos that may not be promoted to replace a deleted main photo.
///
/// ENDED goes beyond the MAIN/DELETED exclusion the tie-break rule names:
/// the state machine has no ENDED -> MAIN edge, so an archived photo could
/// never take the tag.
const REPLACEMENT_EXCLUDED: [PhotoType; 3] = [PhotoType::Main, PhotoType::Deleted, PhotoType::Ended];

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Photo state machine over the metadata and object stores.
///
/// The event row is written first (the version check is the claim), then the
/// photo rows follow with conditional updates: the outgoing MAIN leaves before
/// the incoming one arrives. A caller that loses the race on the event never
/// touches a photo. A caller whose claim is overtaken before its promotion
/// lands rolls the promotion back.
#[derive(Clone)]
pub struct PhotoServiceImpl {
    metadata: MetadataStore,
    storage: PhotoStorage,
}

impl PhotoServiceImpl {
    pub fn new(metadata: MetadataStore, storage: PhotoStorage) -> Self {
        Self { metadata, storage }
    }

    /// Move the previous main photo back to ACTIVE.
    ///
    /// The pointer has already moved on, so a photo that is no longer MAIN
    /// (or no longer exists) is left alone.
    async fn demote(&self, event: &Event, photo_id: PhotoId) -> EventResult<()> {
        let Some(previous) = self.metadata.find_photo(photo_id).await? else {
            warn!(event_id = %event.id, photo_id = %photo_id, "Previous main photo is missing");
            return Ok(());
        };
        if previous.photo_type != PhotoType::Main {
            warn!(
                event_id = %event.id,
                photo_id = %photo_id,
                photo_type = %previous.photo_type,
                "Previous main photo is no longer MAIN, skipping demotion"
            );
            return Ok(());
        }

        match self.metadata.transition_photo(&previous, PhotoType::Active).await {
            Ok(_) => Ok(()),
            Err(EventError::InvalidStateTransition { from, .. }) => {
                warn!(
                    event_id = %event.id,
                    photo_id = %photo_id,
                    photo_type = %from,
                    "Previous main photo changed during demotion"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Re-read the event once `promoted` carries the MAIN tag.
    ///
    /// Returns the current snapshot and whether the pointer still names the
    /// promoted photo. When it does not, the tag has been rolled back.
    async fn settle_main(&self, event_id: EventId, promoted: &Photo) -> EventResult<(Event, bool)> {
        let current = self.metadata.get_event(event_id).await?;
        if current.main_photo_id == Some(promoted.id) {
            return Ok((current, true));
        }

        warn!(
            event_id = %event_id,
            photo_id = %promoted.id,
            pointer = ?current.main_photo_id,
            "Main photo pointer moved during promotion, rolling back"
        );
        match self.metadata.transition_photo(promoted, PhotoType::Active).await {
            // Already demoted by whoever moved the pointer
            Ok(_) | Err(EventError::InvalidStateTransition { .. }) => Ok((current, false)),
            Err(e) => Err(e),
        }
    }

    async fn discard_payloads(&self, object_ids: &[ObjectId]) {
        let results = join_all(object_ids.iter().map(|id| self.storage.delete(*id))).await;
        for (object_id, result) in object_ids.iter().zip(results) {
            if let Err(e) = result {
                warn!(object_id = %object_id, error = %e, "Failed to discard photo payload");
            }
        }
    }

    /// The photo referenced by the pointer is going away: hand the pointer to
    /// the oldest remaining photo, or clear it.
    async fn replace_main(&self, event: &Event, photo: &Photo) -> EventResult<Event> {
        let candidate = match self
            .metadata
            .find_oldest_photo_by_event(event.id, &REPLACEMENT_EXCLUDED)
            .await?
        {
            // The pointer referenced a photo whose MAIN tag was never written
            Some(oldest) if oldest.id == photo.id => self
                .metadata
                .find_photos_by_event(event.id, &REPLACEMENT_EXCLUDED)
                .await?
                .into_iter()
                .find(|p| p.id != photo.id),
            other => other,
        };

        match candidate {
            Some(replacement) => {
                self.metadata
                    .save_event(&event.with_main_photo(Some(replacement.id)))
                    .await?;
                self.metadata
                    .transition_photo(photo, PhotoType::Deleted)
                    .await?;
                let promoted = self
                    .metadata
                    .transition_photo(&replacement, PhotoType::Main)
                    .await?;
                // The deletion stands even if another caller took the pointer
                let (current, kept) = self.settle_main(event.id, &promoted).await?;
                info!(
                    event_id = %event.id,
                    photo_id = %photo.id,
                    replacement_id = %replacement.id,
                    promoted = kept,
                    "Deleted main photo"
                );
                Ok(current)
            }
            None => {
                let updated = self.metadata.save_event(&event.with_main_photo(None)).await?;
                self.metadata
                    .transition_photo(photo, PhotoType::Deleted)
                    .await?;
                info!(
                    event_id = %event.id,
                    photo_id = %photo.id,
                    "Deleted main photo, event has no photos left"
                );
                Ok(updated)
            }
        }
    }
}

#[async_trait]
impl PhotoService for PhotoServiceImpl {
    async fn set_main_photo(&self, event: &Event, photo_id: PhotoId) -> EventResult<Event> {
        let photo = self.metadata.get_photo(photo_id).await?;
        if !photo.belongs_to(event.id) {
            return Err(EventError::not_found(Entity::Photo, photo_id));
        }
        if photo.photo_type.is_terminal() {
            return Err(EventError::InvalidStateTransition {
                photo_id,
                from: photo.photo_type,
                to: PhotoType::Main,
            });
        }

        if event.main_photo_id == Some(photo_id) {
            if photo.photo_type != PhotoType::Main {
                // Finish a promotion that was interrupted after the claim
                let promoted = self.metadata.transition_photo(&photo, PhotoType::Main).await?;
                let (current, kept) = self.settle_main(event.id, &promoted).await?;
                if !kept {
                    return Err(EventError::VersionConflict {
                        event_id: event.id,
                        expected: event.version,
                    });
                }
                info!(event_id = %event.id, photo_id = %photo_id, "Repaired main photo tag");
                return Ok(current);
            }
            return Ok(event.clone());
        }

        photo.transition(PhotoType::Main)?;

        let updated = self
            .metadata
            .save_event(&event.with_main_photo(Some(photo_id)))
            .await?;
        if let Some(previous) = event.main_photo_id {
            self.demote(event, previous).await?;
        }
        let promoted = self.metadata.transition_photo(&photo, PhotoType::Main).await?;
        let (current, kept) = self.settle_main(event.id, &promoted).await?;
        if !kept {
            return Err(EventError::VersionConflict {
                event_id: event.id,
                expected: updated.version,
            });
        }

        info!(
            event_id = %event.id,
            photo_id = %photo_id,
            previous_id = ?event.main_photo_id,
            version = current.version,
            "Set main photo"
        );
        Ok(current)
    }

    async fn delete_photo(&self, event: &Event, photo: &Photo) -> EventResult<Event> {
        if !photo.belongs_to(event.id) {
            return Err(EventError::not_found(Entity::Photo, photo.id));
        }
        if photo.photo_type.is_terminal() {
            return Err(EventError::InvalidStateTransition {
                photo_id: photo.id,
                from: photo.photo_type,
                to: PhotoType::Deleted,
            });
        }

        if event.main_photo_id == Some(photo.id) {
            return self.replace_main(event, photo).await;
        }

        if photo.photo_type == PhotoType::Main {
            warn!(
                event_id = %event.id,
                photo_id = %photo.id,
                "Deleting a MAIN photo the event does not point at"
            );
        }
        self.metadata
            .transition_photo(photo, PhotoType::Deleted)
            .await?;
        info!(event_id = %event.id, photo_id = %photo.id, "Deleted photo");
        Ok(event.clone())
    }

    async fn attach_photos(
        &self,
        event: &Event,
        payloads: Vec<PhotoPayload>,
        role_for_first: PhotoType,
    ) -> EventResult<Vec<Photo>> {
        if !matches!(role_for_first, PhotoType::Active | PhotoType::Main) {
            return Err(ValidationError::InvalidPhotoRole(role_for_first).into());
        }
        if payloads.is_empty() {
            return Ok(Vec::new());
        }

        let mut object_ids = Vec::with_capacity(payloads.len());
        let mut failure = None;
        for result in join_all(payloads.iter().map(|p| self.storage.put(p))).await {
            match result {
                Ok(object_id) => object_ids.push(object_id),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        if let Some(e) = failure {
            self.discard_payloads(&object_ids).await;
            return Err(e);
        }

        // Offset timestamps so upload order survives the created_at ordering
        let now = Utc::now();
        let photos: Vec<Photo> = object_ids
            .iter()
            .copied()
            .enumerate()
            .map(|(i, object_id)| {
                let photo_type = if i == 0 {
                    role_for_first
                } else {
                    PhotoType::Active
                };
                Photo::new(
                    event.id,
                    object_id,
                    photo_type,
                    now + Duration::microseconds(i as i64),
                )
            })
            .collect();

        if let Err(e) = self.metadata.save_photos(&photos).await {
            self.discard_payloads(&object_ids).await;
            return Err(e);
        }
        info!(event_id = %event.id, count = photos.len(), "Attached photos");
        Ok(photos)
    }

    async fn read_photo(&self, photo_id: PhotoId) -> EventResult<PhotoContent> {
        let photo = self.metadata.get_photo(photo_id).await?;
        if photo.photo_type == PhotoType::Deleted {
            return Err(EventError::not_found(Entity::Photo, photo_id));
        }

        let stored = self.storage.get(photo.object_id).await?;
        debug!(photo_id = %photo_id, size = stored.data.len(), "Read photo");
        Ok(PhotoContent {
            photo_id,
            content_type: stored
                .content_type
                .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string()),
            data: stored.data,
        })
    }
}
