pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core business entities and value objects
pub use domain::{
    // Value objects
    AlcoholicId,
    // Models
    CreateEventRequest,
    // Errors
    Entity,
    Event,
    EventDetails,
    EventError,
    EventId,
    EventPolicy,
    EventResult,
    EventStatus,
    EventSummary,
    EventType,
    InvitationLink,
    Membership,
    Page,
    PageRequest,
    Photo,
    PhotoContent,
    PhotoId,
    PhotoPayload,
    PhotoType,
    StorageError,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{
    // Repository ports
    EventRepository,
    // Service ports
    EventService,
    MembershipRepository,
    // Storage ports
    ObjectStore,
    PhotoRepository,
    PhotoService,
};

// Service implementations - business logic
pub use services::{
    strategy::{EventStrategy, EventStrategyRegistry, JoinChannel},
    EventServiceImpl, EventValidator, MetadataStore, PhotoServiceImpl, PhotoStorage,
};

// Application factory and configuration
pub use app::{
    create_app_from_env, create_in_memory_app, AppBuilder, AppConfig, AppDependencies, AppError,
    AppServices, RepositoryBackend, StorageBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::{
    persistence::{InMemoryRepository, SqlRepository},
    storage::ApacheObjectStoreAdapter,
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, AlcoholicId, AppBuilder, AppServices, CreateEventRequest, EventError,
        EventId, EventService, EventType, PageRequest, PhotoId, PhotoPayload, PhotoService,
        PhotoType,
    };
}
