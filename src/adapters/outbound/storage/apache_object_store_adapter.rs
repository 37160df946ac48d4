use async_trait::async_trait;
use bytes::Bytes;
use object_store::{
    path::Path as ObjectPath, Attribute, AttributeValue, Attributes, ObjectStore as ApacheObjectStore,
    PutOptions, PutPayload,
};
use std::sync::Arc;

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        value_objects::ObjectId,
    },
    ports::storage::{ObjectStore, StoredObject},
};

/// Adapter that implements our ObjectStore trait using Apache object_store
pub struct ApacheObjectStoreAdapter {
    inner: Arc<dyn ApacheObjectStore>,
    prefix: Option<String>,
}

impl ApacheObjectStoreAdapter {
    pub fn new(store: Arc<dyn ApacheObjectStore>) -> Self {
        Self {
            inner: store,
            prefix: None,
        }
    }

    /// Keep every payload under `prefix/` inside the bucket
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_matches('/');
        self.prefix = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    fn path(&self, key: &ObjectId) -> ObjectPath {
        match &self.prefix {
            Some(prefix) => ObjectPath::from(format!("{}/{}", prefix, key)),
            None => ObjectPath::from(key.to_string()),
        }
    }

    fn map_error(key: &ObjectId, action: &str, e: object_store::Error) -> StorageError {
        match e {
            object_store::Error::NotFound { .. } => StorageError::ObjectNotFound { object_id: *key },
            _ => StorageError::InfrastructureError {
                message: format!("Failed to {} object: {}", action, e),
                source: Some(e.to_string()),
            },
        }
    }
}

#[async_trait]
impl ObjectStore for ApacheObjectStoreAdapter {
    async fn put_object(
        &self,
        key: &ObjectId,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<()> {
        let mut attributes = Attributes::new();
        if let Some(content_type) = content_type {
            attributes.insert(
                Attribute::ContentType,
                AttributeValue::from(content_type.to_string()),
            );
        }
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.inner
            .put_opts(&self.path(key), PutPayload::from(data), options)
            .await
            .map_err(|e| Self::map_error(key, "put", e))?;

        Ok(())
    }

    async fn get_object(&self, key: &ObjectId) -> StorageResult<StoredObject> {
        let result = self
            .inner
            .get(&self.path(key))
            .await
            .map_err(|e| Self::map_error(key, "get", e))?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.as_ref().to_string());

        let data = result
            .bytes()
            .await
            .map_err(|e| StorageError::InfrastructureError {
                message: format!("Failed to read object bytes: {}", e),
                source: Some(e.to_string()),
            })?;

        Ok(StoredObject { data, content_type })
    }

    async fn delete_object(&self, key: &ObjectId) -> StorageResult<()> {
        self.inner
            .delete(&self.path(key))
            .await
            .map_err(|e| Self::map_error(key, "delete", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn adapter() -> ApacheObjectStoreAdapter {
        ApacheObjectStoreAdapter::new(Arc::new(InMemory::new())).with_prefix("photos/")
    }

    #[tokio::test]
    async fn test_put_get_keeps_content_type() {
        let store = adapter();
        let key = ObjectId::generate();

        store
            .put_object(&key, Bytes::from_static(b"\xff\xd8jpeg"), Some("image/jpeg"))
            .await
            .unwrap();

        let stored = store.get_object(&key).await.unwrap();
        assert_eq!(stored.data, Bytes::from_static(b"\xff\xd8jpeg"));
        assert_eq!(stored.content_type.as_deref(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn test_missing_object() {
        let store = adapter();
        let key = ObjectId::generate();

        assert!(matches!(
            store.get_object(&key).await,
            Err(StorageError::ObjectNotFound { object_id }) if object_id == key
        ));
    }

    #[tokio::test]
    async fn test_delete_object() {
        let store = adapter();
        let key = ObjectId::generate();
        store
            .put_object(&key, Bytes::from_static(b"data"), None)
            .await
            .unwrap();

        store.delete_object(&key).await.unwrap();
        assert!(matches!(
            store.get_object(&key).await,
            Err(StorageError::ObjectNotFound { .. })
        ));
    }
}
