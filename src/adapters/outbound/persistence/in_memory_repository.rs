use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{Event, Membership, PageRequest, Photo, PhotoType},
        value_objects::{AlcoholicId, EventId, InvitationLink, MembershipId, PhotoId},
    },
    ports::repositories::{EventRepository, MembershipRepository, PhotoRepository},
};

/// In-memory implementation of the repository ports for testing and development
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    data: Arc<RwLock<RepositoryData>>,
}

#[derive(Default)]
struct RepositoryData {
    events: HashMap<EventId, Event>,
    photos: HashMap<PhotoId, Photo>,
    memberships: HashMap<MembershipId, Membership>,
}

impl RepositoryData {
    fn membership_of(&self, event_id: &EventId, alcoholic_id: &AlcoholicId) -> Option<&Membership> {
        self.memberships
            .values()
            .find(|m| m.event_id == *event_id && m.alcoholic_id == *alcoholic_id)
    }

    fn visible_to(&self, alcoholic_id: &AlcoholicId) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .events
            .values()
            .filter(|e| {
                !self
                    .membership_of(&e.id, alcoholic_id)
                    .is_some_and(|m| m.banned)
            })
            .collect();
        sort_newest_first(&mut events);
        events
    }

    fn joined_by(&self, alcoholic_id: &AlcoholicId) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .events
            .values()
            .filter(|e| {
                self.membership_of(&e.id, alcoholic_id)
                    .is_some_and(|m| !m.banned)
            })
            .collect();
        sort_newest_first(&mut events);
        events
    }

    fn photos_of(&self, event_id: &EventId, exclude: &[PhotoType]) -> Vec<Photo> {
        let mut photos: Vec<Photo> = self
            .photos
            .values()
            .filter(|p| p.event_id == *event_id && !exclude.contains(&p.photo_type))
            .cloned()
            .collect();
        photos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        photos
    }

    fn check_membership_unique(&self, membership: &Membership) -> StorageResult<()> {
        if self.memberships.contains_key(&membership.id)
            || self
                .membership_of(&membership.event_id, &membership.alcoholic_id)
                .is_some()
        {
            return Err(StorageError::DuplicateRow {
                table: "event_alcoholic",
                message: format!(
                    "membership of {} in {} already exists",
                    membership.alcoholic_id, membership.event_id
                ),
            });
        }
        Ok(())
    }
}

fn sort_newest_first(events: &mut [&Event]) {
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}

fn paginate(events: Vec<&Event>, page: &PageRequest) -> Vec<Event> {
    events
        .into_iter()
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(page.limit() as usize)
        .cloned()
        .collect()
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryRepository {
    async fn insert_event(&self, event: &Event) -> StorageResult<()> {
        let mut data = self.data.write().await;
        if data.events.contains_key(&event.id)
            || data
                .events
                .values()
                .any(|e| e.invitation_link == event.invitation_link)
        {
            return Err(StorageError::DuplicateRow {
                table: "event",
                message: format!("event {} already exists", event.id),
            });
        }
        data.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn get_event(&self, id: &EventId) -> StorageResult<Option<Event>> {
        let data = self.data.read().await;
        Ok(data.events.get(id).cloned())
    }

    async fn save_event(&self, event: &Event) -> StorageResult<Event> {
        let mut data = self.data.write().await;
        let stored = data
            .events
            .get_mut(&event.id)
            .ok_or_else(|| StorageError::RowNotFound {
                table: "event",
                id: event.id.to_string(),
            })?;

        if stored.version != event.version {
            return Err(StorageError::VersionConflict {
                event_id: event.id,
                expected: event.version,
                actual: Some(stored.version),
            });
        }

        *stored = Event {
            version: event.version + 1,
            ..event.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_event(&self, id: &EventId) -> StorageResult<bool> {
        let mut data = self.data.write().await;
        let existed = data.events.remove(id).is_some();
        data.memberships.retain(|_, m| m.event_id != *id);
        Ok(existed)
    }

    async fn find_event_by_invitation(
        &self,
        link: &InvitationLink,
    ) -> StorageResult<Option<Event>> {
        let data = self.data.read().await;
        Ok(data
            .events
            .values()
            .find(|e| e.invitation_link == *link)
            .cloned())
    }

    async fn list_events_visible_to(
        &self,
        alcoholic_id: &AlcoholicId,
        page: &PageRequest,
    ) -> StorageResult<Vec<Event>> {
        let data = self.data.read().await;
        Ok(paginate(data.visible_to(alcoholic_id), page))
    }

    async fn count_events_visible_to(&self, alcoholic_id: &AlcoholicId) -> StorageResult<u64> {
        let data = self.data.read().await;
        Ok(data.visible_to(alcoholic_id).len() as u64)
    }

    async fn list_events_joined_by(
        &self,
        alcoholic_id: &AlcoholicId,
        page: &PageRequest,
    ) -> StorageResult<Vec<Event>> {
        let data = self.data.read().await;
        Ok(paginate(data.joined_by(alcoholic_id), page))
    }

    async fn count_events_joined_by(&self, alcoholic_id: &AlcoholicId) -> StorageResult<u64> {
        let data = self.data.read().await;
        Ok(data.joined_by(alcoholic_id).len() as u64)
    }
}

#[async_trait]
impl PhotoRepository for InMemoryRepository {
    async fn save_photo(&self, photo: &Photo) -> StorageResult<()> {
        let mut data = self.data.write().await;
        data.photos.insert(photo.id, photo.clone());
        Ok(())
    }

    async fn save_photos(&self, photos: &[Photo]) -> StorageResult<()> {
        let mut data = self.data.write().await;
        for photo in photos {
            data.photos.insert(photo.id, photo.clone());
        }
        Ok(())
    }

    async fn get_photo(&self, id: &PhotoId) -> StorageResult<Option<Photo>> {
        let data = self.data.read().await;
        Ok(data.photos.get(id).cloned())
    }

    async fn find_photos_by_event(
        &self,
        event_id: &EventId,
        exclude: &[PhotoType],
    ) -> StorageResult<Vec<Photo>> {
        let data = self.data.read().await;
        Ok(data.photos_of(event_id, exclude))
    }

    async fn find_oldest_photo_by_event(
        &self,
        event_id: &EventId,
        exclude: &[PhotoType],
    ) -> StorageResult<Option<Photo>> {
        let data = self.data.read().await;
        Ok(data.photos_of(event_id, exclude).into_iter().next())
    }

    async fn transition_photo_type(
        &self,
        id: &PhotoId,
        from: PhotoType,
        to: PhotoType,
    ) -> StorageResult<Photo> {
        let mut data = self.data.write().await;
        let photo = data
            .photos
            .get_mut(id)
            .ok_or_else(|| StorageError::RowNotFound {
                table: "event_photo",
                id: id.to_string(),
            })?;

        if photo.photo_type != from {
            return Err(StorageError::PhotoTypeConflict {
                photo_id: *id,
                expected: from,
                actual: photo.photo_type,
                attempted: to,
            });
        }

        photo.photo_type = to;
        Ok(photo.clone())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryRepository {
    async fn find_membership(
        &self,
        event_id: &EventId,
        alcoholic_id: &AlcoholicId,
    ) -> StorageResult<Option<Membership>> {
        let data = self.data.read().await;
        Ok(data.membership_of(event_id, alcoholic_id).cloned())
    }

    async fn save_membership(&self, membership: &Membership) -> StorageResult<()> {
        let mut data = self.data.write().await;
        data.check_membership_unique(membership)?;
        data.memberships.insert(membership.id, membership.clone());
        Ok(())
    }

    async fn save_memberships(&self, memberships: &[Membership]) -> StorageResult<()> {
        let mut data = self.data.write().await;
        // Validate the whole batch before inserting anything
        for (i, membership) in memberships.iter().enumerate() {
            data.check_membership_unique(membership)?;
            if memberships[..i].iter().any(|m| {
                m.event_id == membership.event_id && m.alcoholic_id == membership.alcoholic_id
            }) {
                return Err(StorageError::DuplicateRow {
                    table: "event_alcoholic",
                    message: format!("membership of {} listed twice", membership.alcoholic_id),
                });
            }
        }
        for membership in memberships {
            data.memberships.insert(membership.id, membership.clone());
        }
        Ok(())
    }

    async fn delete_membership(&self, id: &MembershipId) -> StorageResult<bool> {
        let mut data = self.data.write().await;
        Ok(data.memberships.remove(id).is_some())
    }

    async fn list_memberships_by_event(
        &self,
        event_id: &EventId,
    ) -> StorageResult<Vec<Membership>> {
        let data = self.data.read().await;
        let mut memberships: Vec<Membership> = data
            .memberships
            .values()
            .filter(|m| m.event_id == *event_id)
            .cloned()
            .collect();
        memberships.sort_by_key(|m| m.alcoholic_id);
        Ok(memberships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        models::{CreateEventRequest, EventType},
        value_objects::ObjectId,
    };
    use chrono::{Duration, Utc};
    use std::collections::BTreeSet;

    fn event() -> Event {
        let now = Utc::now();
        let request = CreateEventRequest {
            title: "Picnic".to_string(),
            info: String::new(),
            event_type: EventType::Public,
            location: "Park".to_string(),
            start_time: now,
            end_time: now + Duration::hours(4),
            invited: BTreeSet::new(),
        };
        Event::from_request(&request, AlcoholicId::generate(), now)
    }

    #[tokio::test]
    async fn test_save_event_checks_version() {
        let repo = InMemoryRepository::new();
        let event = event();
        repo.insert_event(&event).await.unwrap();

        let saved = repo
            .save_event(&event.with_main_photo(Some(PhotoId::generate())))
            .await
            .unwrap();
        assert_eq!(saved.version, event.version + 1);

        // The original snapshot is now stale
        let err = repo.save_event(&event).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::VersionConflict {
                expected: 0,
                actual: Some(1),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_conditional_photo_transition() {
        let repo = InMemoryRepository::new();
        let photo = Photo::new(
            EventId::generate(),
            ObjectId::generate(),
            PhotoType::Active,
            Utc::now(),
        );
        repo.save_photo(&photo).await.unwrap();

        let main = repo
            .transition_photo_type(&photo.id, PhotoType::Active, PhotoType::Main)
            .await
            .unwrap();
        assert_eq!(main.photo_type, PhotoType::Main);

        let err = repo
            .transition_photo_type(&photo.id, PhotoType::Active, PhotoType::Deleted)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::PhotoTypeConflict {
                actual: PhotoType::Main,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_membership_batch_is_atomic() {
        let repo = InMemoryRepository::new();
        let event_id = EventId::generate();
        let alcoholic = AlcoholicId::generate();
        repo.save_membership(&Membership::new(event_id, alcoholic))
            .await
            .unwrap();

        let newcomer = AlcoholicId::generate();
        let result = repo
            .save_memberships(&[
                Membership::new(event_id, newcomer),
                Membership::new(event_id, alcoholic),
            ])
            .await;

        assert!(matches!(result, Err(StorageError::DuplicateRow { .. })));
        assert!(repo
            .find_membership(&event_id, &newcomer)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_event_removes_memberships() {
        let repo = InMemoryRepository::new();
        let event = event();
        repo.insert_event(&event).await.unwrap();
        repo.save_membership(&Membership::new(event.id, event.created_by))
            .await
            .unwrap();

        assert!(repo.delete_event(&event.id).await.unwrap());
        assert!(repo
            .list_memberships_by_event(&event.id)
            .await
            .unwrap()
            .is_empty());
        assert!(!repo.delete_event(&event.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_banned_events_are_hidden() {
        let repo = InMemoryRepository::new();
        let visible = event();
        let hidden = event();
        let alcoholic = AlcoholicId::generate();
        repo.insert_event(&visible).await.unwrap();
        repo.insert_event(&hidden).await.unwrap();
        repo.save_membership(&Membership::banned(hidden.id, alcoholic))
            .await
            .unwrap();

        let events = repo
            .list_events_visible_to(&alcoholic, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, visible.id);
        assert_eq!(repo.count_events_visible_to(&alcoholic).await.unwrap(), 1);
        assert_eq!(repo.count_events_joined_by(&alcoholic).await.unwrap(), 0);
    }
}
