use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AlcoholicId, EventId, MembershipId};

/// Participation of an alcoholic in an event.
///
/// A banned row is kept so the user cannot join again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub event_id: EventId,
    pub alcoholic_id: AlcoholicId,
    pub banned: bool,
}

impl Membership {
    pub fn new(event_id: EventId, alcoholic_id: AlcoholicId) -> Self {
        Self {
            id: MembershipId::generate(),
            event_id,
            alcoholic_id,
            banned: false,
        }
    }

    pub fn banned(event_id: EventId, alcoholic_id: AlcoholicId) -> Self {
        Self {
            banned: true,
            ..Self::new(event_id, alcoholic_id)
        }
    }
}
