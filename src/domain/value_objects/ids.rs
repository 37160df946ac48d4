use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Declares an opaque UUID-backed identifier.
///
/// Every identifier in the system is a distinct type so an `EventId` can never
/// be passed where a `PhotoId` is expected, even though both are UUIDs on the wire.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh random identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of an event
    EventId
);

uuid_id!(
    /// Identifier of a photo metadata row
    PhotoId
);

uuid_id!(
    /// Identifier of a user ("alcoholic") taking part in events
    AlcoholicId
);

uuid_id!(
    /// Identifier of a membership row
    MembershipId
);

uuid_id!(
    /// Key of a binary payload in the object store, minted by the metadata layer
    ObjectId
);

uuid_id!(
    /// Shareable link token that resolves to a single event
    InvitationLink
);
