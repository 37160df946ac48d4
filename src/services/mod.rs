mod event_service_impl;
mod metadata_store;
mod photo_service_impl;
mod photo_storage;
pub mod strategy;
mod validation;

pub use event_service_impl::EventServiceImpl;
pub use metadata_store::MetadataStore;
pub use photo_service_impl::PhotoServiceImpl;
pub use photo_storage::PhotoStorage;
pub use validation::EventValidator;
