use chrono::TimeDelta;
use object_store::{aws::AmazonS3Builder, memory::InMemory, ObjectStore as ApacheObjectStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

use crate::{
    adapters::outbound::{
        persistence::{InMemoryRepository, SqlRepository},
        storage::ApacheObjectStoreAdapter,
    },
    domain::models::{EventPolicy, EventType},
    ports::{
        repositories::{EventRepository, MembershipRepository, PhotoRepository},
        services::PhotoService,
        storage::ObjectStore,
    },
    services::{
        strategy::{
            EventCreator, EventStrategy, EventStrategyRegistry, PrivateEventStrategy,
            PublicEventStrategy,
        },
        EventServiceImpl, EventValidator, MetadataStore, PhotoServiceImpl, PhotoStorage,
    },
};

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub repository_backend: RepositoryBackend,
    pub policy: EventPolicy,
    /// Event types to register a strategy for
    pub event_types: Vec<EventType>,
    /// Key prefix for photo payloads inside the bucket
    pub object_prefix: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::InMemory,
            repository_backend: RepositoryBackend::InMemory,
            policy: EventPolicy::default(),
            event_types: vec![EventType::Public, EventType::Private],
            object_prefix: None,
        }
    }
}

/// Storage backend configuration
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    S3 {
        bucket: String,
        region: String,
        access_key: Option<String>,
        secret_key: Option<String>,
    },
    MinIO {
        endpoint: String,
        bucket: String,
        access_key: String,
        secret_key: String,
        use_ssl: bool,
    },
}

/// Repository backend configuration
#[derive(Debug, Clone)]
pub enum RepositoryBackend {
    InMemory,
    Database {
        connection_string: String,
        max_connections: u32,
    },
}

/// Application dependencies container
pub struct AppDependencies {
    pub object_store: Arc<dyn ObjectStore>,
    pub event_repository: Arc<dyn EventRepository>,
    pub photo_repository: Arc<dyn PhotoRepository>,
    pub membership_repository: Arc<dyn MembershipRepository>,
}

/// Application services container
pub struct AppServices {
    pub event_service: EventServiceImpl,
    pub photo_service: Arc<PhotoServiceImpl>,
    /// Direct access to the metadata rows, for moderation tools and tests
    pub metadata_store: MetadataStore,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    /// Configure repository backend
    pub fn with_repository_backend(mut self, backend: RepositoryBackend) -> Self {
        self.config.repository_backend = backend;
        self
    }

    pub fn with_policy(mut self, policy: EventPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn with_event_types(mut self, event_types: Vec<EventType>) -> Self {
        self.config.event_types = event_types;
        self
    }

    /// Build the application dependencies
    pub async fn build_dependencies(&self) -> Result<AppDependencies, AppError> {
        let object_store = self.create_object_store()?;
        let (event_repository, photo_repository, membership_repository) =
            self.create_repositories().await?;

        Ok(AppDependencies {
            object_store,
            event_repository,
            photo_repository,
            membership_repository,
        })
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let deps = self.build_dependencies().await?;

        let metadata_store = MetadataStore::new(
            deps.event_repository,
            deps.photo_repository,
            deps.membership_repository,
        );
        let photo_service = Arc::new(PhotoServiceImpl::new(
            metadata_store.clone(),
            PhotoStorage::new(deps.object_store),
        ));
        let validator =
            EventValidator::new(metadata_store.clone(), validate_policy(self.config.policy.clone())?);

        let registry = self.create_registry(&metadata_store, &validator, photo_service.clone())?;
        info!(event_types = ?registry.registered_types(), "Registered event strategies");

        let event_service = EventServiceImpl::new(
            registry,
            metadata_store.clone(),
            validator,
            photo_service.clone(),
        );

        Ok(AppServices {
            event_service,
            photo_service,
            metadata_store,
        })
    }

    fn create_registry(
        &self,
        metadata: &MetadataStore,
        validator: &EventValidator,
        photos: Arc<dyn PhotoService>,
    ) -> Result<EventStrategyRegistry, AppError> {
        let creator = EventCreator::new(metadata.clone(), validator.clone(), photos);
        let strategies: Vec<Arc<dyn EventStrategy>> = self
            .config
            .event_types
            .iter()
            .map(|event_type| -> Arc<dyn EventStrategy> {
                match event_type {
                    EventType::Public => Arc::new(PublicEventStrategy::new(
                        creator.clone(),
                        validator.clone(),
                        metadata.clone(),
                    )),
                    EventType::Private => Arc::new(PrivateEventStrategy::new(
                        creator.clone(),
                        validator.clone(),
                        metadata.clone(),
                    )),
                }
            })
            .collect();

        EventStrategyRegistry::new(strategies).map_err(|e| AppError::ServiceInit {
            message: e.to_string(),
        })
    }

    /// Create the object store adapter based on configuration
    fn create_object_store(&self) -> Result<Arc<dyn ObjectStore>, AppError> {
        let store: Arc<dyn ApacheObjectStore> = match &self.config.storage_backend {
            StorageBackend::InMemory => Arc::new(InMemory::new()),
            StorageBackend::S3 {
                bucket,
                region,
                access_key,
                secret_key,
            } => {
                let mut builder = AmazonS3Builder::from_env()
                    .with_bucket_name(bucket)
                    .with_region(region);
                if let Some(access_key) = access_key {
                    builder = builder.with_access_key_id(access_key);
                }
                if let Some(secret_key) = secret_key {
                    builder = builder.with_secret_access_key(secret_key);
                }
                Arc::new(builder.build().map_err(|e| AppError::StorageInit {
                    message: format!("Failed to create S3 store: {}", e),
                })?)
            }
            StorageBackend::MinIO {
                endpoint,
                bucket,
                access_key,
                secret_key,
                use_ssl,
            } => {
                let store = AmazonS3Builder::new()
                    .with_endpoint(endpoint)
                    .with_bucket_name(bucket)
                    .with_access_key_id(access_key)
                    .with_secret_access_key(secret_key)
                    .with_region("us-east-1")
                    .with_virtual_hosted_style_request(false)
                    .with_allow_http(!use_ssl)
                    .build()
                    .map_err(|e| AppError::StorageInit {
                        message: format!("Failed to create MinIO store: {}", e),
                    })?;
                Arc::new(store)
            }
        };

        let adapter = ApacheObjectStoreAdapter::new(store);
        let adapter = match &self.config.object_prefix {
            Some(prefix) => adapter.with_prefix(prefix.clone()),
            None => adapter,
        };
        Ok(Arc::new(adapter))
    }

    /// Create repositories based on configuration
    async fn create_repositories(
        &self,
    ) -> Result<
        (
            Arc<dyn EventRepository>,
            Arc<dyn PhotoRepository>,
            Arc<dyn MembershipRepository>,
        ),
        AppError,
    > {
        match &self.config.repository_backend {
            RepositoryBackend::InMemory => {
                let repo = Arc::new(InMemoryRepository::new());
                let events: Arc<dyn EventRepository> = repo.clone();
                let photos: Arc<dyn PhotoRepository> = repo.clone();
                let memberships: Arc<dyn MembershipRepository> = repo;
                Ok((events, photos, memberships))
            }
            RepositoryBackend::Database {
                connection_string,
                max_connections,
            } => {
                let pool = PgPoolOptions::new()
                    .max_connections(*max_connections)
                    .connect(connection_string)
                    .await
                    .map_err(|e| AppError::RepositoryInit {
                        message: format!("Failed to connect to database: {}", e),
                    })?;

                let repo = SqlRepository::new(pool);
                repo.migrate().await.map_err(|e| AppError::RepositoryInit {
                    message: format!("Failed to run migrations: {}", e),
                })?;

                let repo = Arc::new(repo);
                let events: Arc<dyn EventRepository> = repo.clone();
                let photos: Arc<dyn PhotoRepository> = repo.clone();
                let memberships: Arc<dyn MembershipRepository> = repo;
                Ok((events, photos, memberships))
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },

    #[error("Repository initialization error: {message}")]
    RepositoryInit { message: String },

    #[error("Service initialization error: {message}")]
    ServiceInit { message: String },
}

/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::InMemory)
        .with_repository_backend(RepositoryBackend::InMemory)
        .build()
        .await
}

fn required_env(name: &str) -> Result<String, AppError> {
    std::env::var(name).map_err(|_| AppError::Configuration {
        message: format!("{} environment variable required", name),
    })
}

fn parsed_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match std::env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| AppError::Configuration {
            message: format!("{} has an invalid value: '{}'", name, value),
        }),
        Err(_) => Ok(default),
    }
}

/// Day limits must be positive and representable as a time span
fn validate_day_limit(name: &str, days: i64) -> Result<i64, AppError> {
    if days <= 0 || TimeDelta::try_days(days).is_none() {
        return Err(AppError::Configuration {
            message: format!("{} must be a positive number of days, got {}", name, days),
        });
    }
    Ok(days)
}

/// Reject policies whose day limits cannot be applied
pub fn validate_policy(policy: EventPolicy) -> Result<EventPolicy, AppError> {
    validate_day_limit("EVENT_MAX_START_AGE_DAYS", policy.max_start_age_days)?;
    validate_day_limit("EVENT_MAX_END_HORIZON_DAYS", policy.max_end_horizon_days)?;
    Ok(policy)
}

/// Read the event policy, falling back to defaults for unset variables
pub fn policy_from_env() -> Result<EventPolicy, AppError> {
    let defaults = EventPolicy::default();
    validate_policy(EventPolicy {
        max_start_age_days: parsed_env("EVENT_MAX_START_AGE_DAYS", defaults.max_start_age_days)?,
        max_end_horizon_days: parsed_env(
            "EVENT_MAX_END_HORIZON_DAYS",
            defaults.max_end_horizon_days,
        )?,
        accepted_content_type: std::env::var("PHOTO_CONTENT_TYPE")
            .unwrap_or(defaults.accepted_content_type),
    })
}

/// Parse a comma separated list such as `PUBLIC,PRIVATE`
pub fn parse_event_types(value: &str) -> Result<Vec<EventType>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|e| AppError::Configuration {
                message: format!("EVENT_TYPES: {}", e),
            })
        })
        .collect()
}

/// Create application configuration from environment variables
pub fn config_from_env() -> Result<AppConfig, AppError> {
    let storage_backend = match std::env::var("STORAGE_BACKEND").as_deref() {
        Ok("s3") => StorageBackend::S3 {
            bucket: required_env("S3_BUCKET")?,
            region: required_env("S3_REGION")?,
            access_key: std::env::var("S3_ACCESS_KEY").ok(),
            secret_key: std::env::var("S3_SECRET_KEY").ok(),
        },
        Ok("minio") => StorageBackend::MinIO {
            endpoint: required_env("MINIO_ENDPOINT")?,
            bucket: required_env("MINIO_BUCKET")?,
            access_key: required_env("MINIO_ACCESS_KEY")?,
            secret_key: required_env("MINIO_SECRET_KEY")?,
            use_ssl: std::env::var("MINIO_USE_SSL")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
        },
        _ => StorageBackend::InMemory,
    };

    let repository_backend = match std::env::var("REPOSITORY_BACKEND").as_deref() {
        Ok("database") => RepositoryBackend::Database {
            connection_string: required_env("DATABASE_URL")?,
            max_connections: parsed_env("DATABASE_MAX_CONNECTIONS", 5)?,
        },
        _ => RepositoryBackend::InMemory,
    };

    let event_types = match std::env::var("EVENT_TYPES") {
        Ok(value) => parse_event_types(&value)?,
        Err(_) => AppConfig::default().event_types,
    };

    Ok(AppConfig {
        storage_backend,
        repository_backend,
        policy: policy_from_env()?,
        event_types,
        object_prefix: std::env::var("OBJECT_PREFIX").ok(),
    })
}

/// Create application from environment variables
pub async fn create_app_from_env() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_config(config_from_env()?)
        .build()
        .await
}
