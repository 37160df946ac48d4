use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    domain::{
        errors::{EventError, EventResult, ValidationError},
        models::{Event, EventPolicy, EventStatus, Membership, PhotoPayload},
        value_objects::{AlcoholicId, EventId},
    },
    services::MetadataStore,
};

/// Checks that run before any write
#[derive(Clone)]
pub struct EventValidator {
    metadata: MetadataStore,
    policy: EventPolicy,
}

impl EventValidator {
    pub fn new(metadata: MetadataStore, policy: EventPolicy) -> Self {
        Self { metadata, policy }
    }

    /// Start may lie at most `max_start_age_days` in the past, end must not be
    /// in the past nor beyond `max_end_horizon_days`. Both limits are inclusive;
    /// a limit too large to represent as an instant is no limit.
    pub fn validate_dates(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let earliest_start = TimeDelta::try_days(self.policy.max_start_age_days)
            .and_then(|age| now.checked_sub_signed(age));
        if earliest_start.is_some_and(|earliest| start < earliest) {
            return Err(ValidationError::StartTooFarInPast {
                max_age_days: self.policy.max_start_age_days,
            });
        }
        if start > end {
            return Err(ValidationError::StartAfterEnd);
        }
        if end < now {
            return Err(ValidationError::EndInPast);
        }
        let latest_end = TimeDelta::try_days(self.policy.max_end_horizon_days)
            .and_then(|horizon| now.checked_add_signed(horizon));
        if latest_end.is_some_and(|latest| end > latest) {
            return Err(ValidationError::EndTooFarInFuture {
                max_horizon_days: self.policy.max_end_horizon_days,
            });
        }
        Ok(())
    }

    pub fn validate_title(&self, title: &str) -> Result<(), ValidationError> {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }

    pub fn validate_is_owner(&self, event: &Event, alcoholic_id: AlcoholicId) -> EventResult<()> {
        if !event.is_created_by(alcoholic_id) {
            return Err(EventError::PermissionDenied {
                event_id: event.id,
                alcoholic_id,
            });
        }
        Ok(())
    }

    pub fn validate_event_not_ended(&self, event: &Event, now: DateTime<Utc>) -> EventResult<()> {
        if event.status_at(now) == EventStatus::Ended {
            return Err(EventError::EventEnded { event_id: event.id });
        }
        Ok(())
    }

    /// Every payload must declare the accepted content type
    pub fn validate_photo_content_types(
        &self,
        payloads: &[PhotoPayload],
    ) -> Result<(), ValidationError> {
        let expected = &self.policy.accepted_content_type;
        match payloads
            .iter()
            .find(|p| p.content_type.as_deref() != Some(expected.as_str()))
        {
            Some(payload) => Err(ValidationError::UnsupportedContentType {
                expected: expected.clone(),
                actual: payload.content_type.clone(),
            }),
            None => Ok(()),
        }
    }

    pub async fn validate_not_banned(
        &self,
        event_id: EventId,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<()> {
        match self.metadata.find_membership(event_id, alcoholic_id).await? {
            Some(membership) if membership.banned => Err(EventError::Banned {
                event_id,
                alcoholic_id,
            }),
            _ => Ok(()),
        }
    }

    /// Returns the membership of a non-banned participant
    pub async fn validate_is_participant(
        &self,
        event_id: EventId,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<Membership> {
        match self.metadata.find_membership(event_id, alcoholic_id).await? {
            Some(membership) if !membership.banned => Ok(membership),
            _ => Err(EventError::membership_not_found(event_id, alcoholic_id)),
        }
    }

    pub async fn validate_not_already_participant(
        &self,
        event_id: EventId,
        alcoholic_id: AlcoholicId,
    ) -> EventResult<()> {
        match self.metadata.find_membership(event_id, alcoholic_id).await? {
            Some(membership) if membership.banned => Err(EventError::Banned {
                event_id,
                alcoholic_id,
            }),
            Some(_) => Err(EventError::AlreadyMember {
                event_id,
                alcoholic_id,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::persistence::InMemoryRepository;
    use chrono::Duration;
    use std::sync::Arc;

    fn validator_with(policy: EventPolicy) -> EventValidator {
        let repo = Arc::new(InMemoryRepository::new());
        let metadata = MetadataStore::new(repo.clone(), repo.clone(), repo);
        EventValidator::new(metadata, policy)
    }

    fn validator() -> EventValidator {
        validator_with(EventPolicy::default())
    }

    #[test]
    fn test_unrepresentable_limits_do_not_bound() {
        let validator = validator_with(EventPolicy {
            max_start_age_days: i64::MAX,
            max_end_horizon_days: 100_000_000,
            ..EventPolicy::default()
        });
        let now = Utc::now();

        assert!(validator
            .validate_dates(now, now + Duration::hours(1), now)
            .is_ok());
        assert!(validator
            .validate_dates(now - Duration::days(365_000), now + Duration::days(365_000), now)
            .is_ok());
    }

    #[test]
    fn test_start_boundary_is_inclusive() {
        let validator = validator();
        let now = Utc::now();
        let end = now + Duration::hours(3);

        assert!(validator
            .validate_dates(now - Duration::days(14), end, now)
            .is_ok());
        assert_eq!(
            validator.validate_dates(now - Duration::days(14) - Duration::seconds(1), end, now),
            Err(ValidationError::StartTooFarInPast { max_age_days: 14 })
        );
    }

    #[test]
    fn test_end_horizon_boundary() {
        let validator = validator();
        let now = Utc::now();

        assert!(validator
            .validate_dates(now, now + Duration::days(3652), now)
            .is_ok());
        assert_eq!(
            validator.validate_dates(now, now + Duration::days(3652) + Duration::seconds(1), now),
            Err(ValidationError::EndTooFarInFuture {
                max_horizon_days: 3652
            })
        );
    }

    #[test]
    fn test_start_after_end_and_end_in_past() {
        let validator = validator();
        let now = Utc::now();

        assert_eq!(
            validator.validate_dates(now + Duration::hours(2), now + Duration::hours(1), now),
            Err(ValidationError::StartAfterEnd)
        );
        assert_eq!(
            validator.validate_dates(now - Duration::days(2), now - Duration::days(1), now),
            Err(ValidationError::EndInPast)
        );
    }

    #[test]
    fn test_content_types() {
        let validator = validator();
        let jpeg = PhotoPayload::new("image/jpeg", vec![1u8, 2, 3]);
        let png = PhotoPayload::new("image/png", vec![1u8]);
        let untyped = PhotoPayload {
            content_type: None,
            data: bytes::Bytes::from_static(b"x"),
        };

        assert!(validator
            .validate_photo_content_types(&[jpeg.clone()])
            .is_ok());
        assert!(validator.validate_photo_content_types(&[]).is_ok());

        let err = validator
            .validate_photo_content_types(&[jpeg.clone(), png])
            .unwrap_err();
        assert_eq!(err.field(), "photos");
        assert!(matches!(
            validator.validate_photo_content_types(&[untyped]),
            Err(ValidationError::UnsupportedContentType { actual: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_membership_checks() {
        let validator = validator();
        let event_id = EventId::generate();
        let member = AlcoholicId::generate();
        let banned = AlcoholicId::generate();
        let stranger = AlcoholicId::generate();
        validator
            .metadata
            .save_memberships(&[
                Membership::new(event_id, member),
                Membership::banned(event_id, banned),
            ])
            .await
            .unwrap();

        assert!(validator.validate_is_participant(event_id, member).await.is_ok());
        assert!(matches!(
            validator.validate_is_participant(event_id, banned).await,
            Err(EventError::NotFound { .. })
        ));
        assert!(matches!(
            validator.validate_not_banned(event_id, banned).await,
            Err(EventError::Banned { .. })
        ));
        assert!(matches!(
            validator.validate_not_already_participant(event_id, member).await,
            Err(EventError::AlreadyMember { .. })
        ));
        assert!(validator
            .validate_not_already_participant(event_id, stranger)
            .await
            .is_ok());
    }
}
