pub mod repositories;
pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use repositories::{EventRepository, MembershipRepository, PhotoRepository};
pub use services::{EventService, PhotoService};
pub use storage::{ObjectStore, StoredObject};
