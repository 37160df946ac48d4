mod event_service;
mod photo_service;

pub use event_service::EventService;
pub use photo_service::PhotoService;
