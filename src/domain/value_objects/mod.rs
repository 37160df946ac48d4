mod ids;

pub use ids::{AlcoholicId, EventId, InvitationLink, MembershipId, ObjectId, PhotoId};
