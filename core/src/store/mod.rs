//! Object store abstraction
//! The gateway only reads; backends own the objects.

pub mod fs;
pub mod memory;
pub mod s3;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};

use crate::config::{expand_path, StoreBackend, StoreConfig};
use crate::error::StoreError;

pub use fs::FsStore;
pub use memory::MemoryStore;
pub use s3::S3Store;

/// Object body as a stream of chunks
pub type ByteStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// Metadata a backend may know about an object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub content_length: Option<u64>,
}

/// An object returned by [`ObjectStore::get`]
pub struct StoredObject {
    pub body: ByteStream,
    pub metadata: ObjectMetadata,
}

impl StoredObject {
    /// Wrap an in-memory buffer as a single-chunk stream
    pub fn from_bytes(data: Bytes, metadata: ObjectMetadata) -> Self {
        Self {
            body: stream::once(async move { Ok(data) }).boxed(),
            metadata,
        }
    }
}

impl fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredObject")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Key-value blob store queried by the gateway
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object. `Ok(None)` means the key is absent.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StoreError>;

    /// Up to `limit` keys starting with `prefix`, sorted.
    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<String>, StoreError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// Build the backend selected in configuration
pub async fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; every lookup will miss until objects are added");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Fs => {
            let root = expand_path(&config.fs.root);
            if !root.is_dir() {
                anyhow::bail!("Filesystem store root is not a directory: {:?}", root);
            }
            let store = FsStore::new(root);
            tracing::info!("Serving files from {:?}", store.root());
            Arc::new(store)
        }
        StoreBackend::S3 => Arc::new(S3Store::connect(&config.s3).await?),
    };

    tracing::info!("Object store backend: {}", store.name());
    Ok(store)
}
