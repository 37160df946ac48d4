use crate::domain::{errors::StorageResult, value_objects::ObjectId};
use async_trait::async_trait;
use bytes::Bytes;

/// Port for binary photo payloads.
/// This abstracts the actual storage backend (S3, MinIO, memory)
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Store object data
    async fn put_object(
        &self,
        key: &ObjectId,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<()>;

    /// Retrieve object data together with its stored content type
    async fn get_object(&self, key: &ObjectId) -> StorageResult<StoredObject>;

    /// Delete object data
    async fn delete_object(&self, key: &ObjectId) -> StorageResult<()>;
}

/// Payload read back from the object store
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: Option<String>,
}
