//! In-memory object store

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use super::{ObjectMetadata, ObjectStore, StoredObject};
use crate::error::StoreError;

#[derive(Clone)]
struct Entry {
    data: Bytes,
    content_type: Option<String>,
    etag: Option<String>,
}

/// Concurrent map of key -> object. Used by tests and local demos.
pub struct MemoryStore {
    objects: DashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: DashMap::new(),
        }
    }

    /// Insert or replace an object
    pub fn put(
        &self,
        key: impl Into<String>,
        data: impl Into<Bytes>,
        content_type: Option<&str>,
        etag: Option<&str>,
    ) {
        self.objects.insert(
            key.into(),
            Entry {
                data: data.into(),
                content_type: content_type.map(str::to_string),
                etag: etag.map(str::to_string),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StoreError> {
        // Clone out so no shard lock is held across the response
        let Some(entry) = self.objects.get(key).map(|e| e.value().clone()) else {
            return Ok(None);
        };

        let metadata = ObjectMetadata {
            content_type: entry.content_type,
            etag: entry.etag,
            content_length: Some(entry.data.len() as u64),
        };
        Ok(Some(StoredObject::from_bytes(entry.data, metadata)))
    }

    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .objects
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        keys.truncate(limit);
        Ok(keys)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
