use std::sync::Arc;
use tracing::debug;

use crate::{
    domain::{errors::EventResult, models::PhotoPayload, value_objects::ObjectId},
    ports::storage::{ObjectStore, StoredObject},
};

/// Binary photo payloads keyed by freshly minted object ids
#[derive(Clone)]
pub struct PhotoStorage {
    store: Arc<dyn ObjectStore>,
}

impl PhotoStorage {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Store a payload under a new key and return the key
    pub async fn put(&self, payload: &PhotoPayload) -> EventResult<ObjectId> {
        let object_id = ObjectId::generate();
        self.store
            .put_object(
                &object_id,
                payload.data.clone(),
                payload.content_type.as_deref(),
            )
            .await?;
        debug!(object_id = %object_id, size = payload.data.len(), "Stored photo payload");
        Ok(object_id)
    }

    pub async fn get(&self, object_id: ObjectId) -> EventResult<StoredObject> {
        Ok(self.store.get_object(&object_id).await?)
    }

    pub async fn delete(&self, object_id: ObjectId) -> EventResult<()> {
        Ok(self.store.delete_object(&object_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::storage::ApacheObjectStoreAdapter;
    use crate::domain::errors::EventError;
    use object_store::memory::InMemory;

    #[tokio::test]
    async fn test_put_mints_fresh_keys() {
        let storage = PhotoStorage::new(Arc::new(ApacheObjectStoreAdapter::new(Arc::new(
            InMemory::new(),
        ))));
        let payload = PhotoPayload::new("image/jpeg", &b"jpeg"[..]);

        let first = storage.put(&payload).await.unwrap();
        let second = storage.put(&payload).await.unwrap();
        assert_ne!(first, second);

        let stored = storage.get(first).await.unwrap();
        assert_eq!(&stored.data[..], b"jpeg");
        assert_eq!(stored.content_type.as_deref(), Some("image/jpeg"));

        storage.delete(first).await.unwrap();
        assert!(matches!(
            storage.get(first).await,
            Err(EventError::NotFound { .. })
        ));
        assert_eq!(&storage.get(second).await.unwrap().data[..], b"jpeg");
    }
}
