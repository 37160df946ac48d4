mod event_repository;
mod membership_repository;
mod photo_repository;

pub use event_repository::EventRepository;
pub use membership_repository::MembershipRepository;
pub use photo_repository::PhotoRepository;
