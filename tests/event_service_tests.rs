use alcoparty_server::{
    create_in_memory_app,
    domain::{
        errors::{Entity, EventError, ValidationError},
        models::{
            CreateEventRequest, Event, EventStatus, EventType, Membership, PageRequest,
            PhotoPayload, PhotoType,
        },
        value_objects::{AlcoholicId, EventId},
    },
    ports::services::EventService,
    AppBuilder, AppServices,
};
use chrono::{Duration, Utc};
use std::collections::BTreeSet;

fn request(event_type: EventType) -> CreateEventRequest {
    let now = Utc::now();
    CreateEventRequest {
        title: "Birthday at the brewery".to_string(),
        info: "First round is on me".to_string(),
        event_type,
        location: "Brewery".to_string(),
        start_time: now + Duration::hours(1),
        end_time: now + Duration::days(1),
        invited: BTreeSet::new(),
    }
}

fn jpeg(bytes: &'static [u8]) -> PhotoPayload {
    PhotoPayload::new("image/jpeg", bytes)
}

async fn create_public(app: &AppServices, creator: AlcoholicId) -> EventId {
    app.event_service
        .create(request(EventType::Public), creator, vec![])
        .await
        .unwrap()
}

/// Insert an event whose window lies entirely in the past
async fn insert_ended_event(app: &AppServices, creator: AlcoholicId) -> Event {
    let now = Utc::now();
    let mut past = request(EventType::Public);
    past.start_time = now - Duration::days(3);
    past.end_time = now - Duration::days(2);
    let event = Event::from_request(&past, creator, now - Duration::days(4));
    app.metadata_store.insert_event(&event).await.unwrap();
    event
}

#[tokio::test]
async fn create_event_with_images() {
    let app = create_in_memory_app().await.unwrap();
    let creator = AlcoholicId::generate();
    let invited = AlcoholicId::generate();
    let mut req = request(EventType::Public);
    req.invited.insert(invited);

    let event_id = app
        .event_service
        .create(
            req,
            creator,
            vec![jpeg(b"main"), jpeg(b"second"), jpeg(b"third")],
        )
        .await
        .unwrap();

    let details = app.event_service.get_event(event_id, creator).await.unwrap();
    let main_id = details.event.main_photo_id.expect("main photo set");
    assert_eq!(details.status, EventStatus::Scheduled);
    assert_eq!(details.photos.len(), 2);
    assert!(!details.photos.contains(&main_id));
    assert_eq!(details.participants.len(), 2);
    assert!(details.participants.contains(&creator));
    assert!(details.participants.contains(&invited));

    let main = app.metadata_store.get_photo(main_id).await.unwrap();
    assert_eq!(main.photo_type, PhotoType::Main);
}

#[tokio::test]
async fn create_rejects_unsupported_content_type() {
    let app = create_in_memory_app().await.unwrap();
    let creator = AlcoholicId::generate();

    let err = app
        .event_service
        .create(
            request(EventType::Public),
            creator,
            vec![jpeg(b"ok"), PhotoPayload::new("image/png", &b"png"[..])],
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EventError::ValidationFailed(ValidationError::UnsupportedContentType { .. })
    ));
    let page = app
        .event_service
        .list_events(creator, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn create_rejects_invalid_dates() {
    let app = create_in_memory_app().await.unwrap();
    let mut req = request(EventType::Public);
    req.start_time = req.end_time + Duration::hours(1);

    let err = app
        .event_service
        .create(req, AlcoholicId::generate(), vec![])
        .await
        .unwrap_err();

    match err {
        EventError::ValidationFailed(validation) => {
            assert_eq!(validation, ValidationError::StartAfterEnd);
            assert_eq!(validation.field(), "start_time");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn create_unregistered_type_is_unsupported() {
    let app = AppBuilder::new()
        .with_event_types(vec![EventType::Public])
        .build()
        .await
        .unwrap();

    let err = app
        .event_service
        .create(request(EventType::Private), AlcoholicId::generate(), vec![])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EventError::UnsupportedEventType {
            event_type: EventType::Private
        }
    ));
}

#[tokio::test]
async fn join_and_rejoin() {
    let app = create_in_memory_app().await.unwrap();
    let creator = AlcoholicId::generate();
    let guest = AlcoholicId::generate();
    let event_id = create_public(&app, creator).await;

    let membership = app.event_service.join(event_id, guest).await.unwrap();
    assert_eq!(membership.event_id, event_id);
    assert!(!membership.banned);

    let err = app.event_service.join(event_id, guest).await.unwrap_err();
    assert!(matches!(err, EventError::AlreadyMember { .. }));
}

#[tokio::test]
async fn cannot_join_own_event() {
    let app = create_in_memory_app().await.unwrap();
    let creator = AlcoholicId::generate();
    let event_id = create_public(&app, creator).await;

    let err = app.event_service.join(event_id, creator).await.unwrap_err();
    assert!(matches!(err, EventError::CannotJoinOwnEvent { .. }));
}

#[tokio::test]
async fn banned_user_cannot_join_or_see_event() {
    let app = create_in_memory_app().await.unwrap();
    let creator = AlcoholicId::generate();
    let troublemaker = AlcoholicId::generate();
    let event_id = create_public(&app, creator).await;
    app.metadata_store
        .save_membership(&Membership::banned(event_id, troublemaker))
        .await
        .unwrap();

    let err = app
        .event_service
        .join(event_id, troublemaker)
        .await
        .unwrap_err();
    assert!(matches!(err, EventError::Banned { .. }));

    let err = app
        .event_service
        .get_event(event_id, troublemaker)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EventError::NotFound {
            entity: Entity::Event,
            ..
        }
    ));

    let details = app.event_service.get_event(event_id, creator).await.unwrap();
    assert_eq!(details.participants, vec![creator]);
}

#[tokio::test]
async fn cannot_join_ended_event() {
    let app = create_in_memory_app().await.unwrap();
    let event = insert_ended_event(&app, AlcoholicId::generate()).await;

    let err = app
        .event_service
        .join(event.id, AlcoholicId::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, EventError::EventEnded { .. }));
}

#[tokio::test]
async fn join_missing_event() {
    let app = create_in_memory_app().await.unwrap();

    let err = app
        .event_service
        .join(EventId::generate(), AlcoholicId::generate())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EventError::NotFound {
            entity: Entity::Event,
            ..
        }
    ));
}

#[tokio::test]
async fn private_event_requires_invitation() {
    let app = create_in_memory_app().await.unwrap();
    let creator = AlcoholicId::generate();
    let guest = AlcoholicId::generate();
    let event_id = app
        .event_service
        .create(request(EventType::Private), creator, vec![])
        .await
        .unwrap();
    let link = app
        .metadata_store
        .get_event(event_id)
        .await
        .unwrap()
        .invitation_link;

    let err = app.event_service.join(event_id, guest).await.unwrap_err();
    assert!(matches!(err, EventError::InvitationRequired { .. }));

    let details = app.event_service.get_event_by_invitation(link).await.unwrap();
    assert_eq!(details.event.id, event_id);

    app.event_service
        .join_by_invitation(link, guest)
        .await
        .unwrap();
    let joined = app
        .event_service
        .list_events_joined_by(guest, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(joined.total, 1);
    assert!(joined.items[0].is_participant);
}

#[tokio::test]
async fn invitation_of_ended_event_is_not_found() {
    let app = create_in_memory_app().await.unwrap();
    let event = insert_ended_event(&app, AlcoholicId::generate()).await;

    let err = app
        .event_service
        .get_event_by_invitation(event.invitation_link)
        .await
        .unwrap_err();
    assert!(matches!(err, EventError::NotFound { .. }));
}

#[tokio::test]
async fn leave_event() {
    let app = create_in_memory_app().await.unwrap();
    let creator = AlcoholicId::generate();
    let guest = AlcoholicId::generate();
    let event_id = create_public(&app, creator).await;
    app.event_service.join(event_id, guest).await.unwrap();

    app.event_service.leave(event_id, guest).await.unwrap();

    let joined = app
        .event_service
        .list_events_joined_by(guest, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(joined.total, 0);

    let err = app.event_service.leave(event_id, guest).await.unwrap_err();
    assert!(matches!(
        err,
        EventError::NotFound {
            entity: Entity::Membership,
            ..
        }
    ));
}

#[tokio::test]
async fn only_creator_can_disband() {
    let app = create_in_memory_app().await.unwrap();
    let creator = AlcoholicId::generate();
    let guest = AlcoholicId::generate();
    let event_id = create_public(&app, creator).await;
    app.event_service.join(event_id, guest).await.unwrap();

    let err = app.event_service.disband(event_id, guest).await.unwrap_err();
    assert!(matches!(err, EventError::PermissionDenied { .. }));

    app.event_service.disband(event_id, creator).await.unwrap();

    assert!(matches!(
        app.event_service.get_event(event_id, creator).await,
        Err(EventError::NotFound { .. })
    ));
    assert!(app
        .metadata_store
        .list_memberships_by_event(event_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn list_events_hides_banned_and_flags_participation() {
    let app = create_in_memory_app().await.unwrap();
    let viewer = AlcoholicId::generate();
    let joined = create_public(&app, AlcoholicId::generate()).await;
    let other = create_public(&app, AlcoholicId::generate()).await;
    let banned = create_public(&app, AlcoholicId::generate()).await;
    app.event_service.join(joined, viewer).await.unwrap();
    app.metadata_store
        .save_membership(&Membership::banned(banned, viewer))
        .await
        .unwrap();

    let page = app
        .event_service
        .list_events(viewer, PageRequest::new(0, 10))
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);
    for summary in &page.items {
        assert_ne!(summary.event.id, banned);
        assert_eq!(summary.is_participant, summary.event.id == joined);
    }
    assert!(page.items.iter().any(|s| s.event.id == other));

    let first = app
        .event_service
        .list_events(viewer, PageRequest::new(0, 1))
        .await
        .unwrap();
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.total_pages(), 2);
}

#[tokio::test]
async fn add_photos_requires_participation() {
    let app = create_in_memory_app().await.unwrap();
    let creator = AlcoholicId::generate();
    let stranger = AlcoholicId::generate();
    let event_id = create_public(&app, creator).await;

    let err = app
        .event_service
        .add_photos(event_id, stranger, vec![jpeg(b"sneaky")])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EventError::NotFound {
            entity: Entity::Membership,
            ..
        }
    ));

    let err = app
        .event_service
        .add_photos(event_id, creator, vec![])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EventError::ValidationFailed(ValidationError::NoPhotos)
    ));

    let ids = app
        .event_service
        .add_photos(event_id, creator, vec![jpeg(b"one"), jpeg(b"two")])
        .await
        .unwrap();
    let details = app.event_service.get_event(event_id, creator).await.unwrap();
    assert_eq!(details.photos, ids);
    assert_eq!(details.event.main_photo_id, None);
}
