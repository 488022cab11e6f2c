//! Filesystem-backed object store
//! Objects are plain files under a root directory, keyed by relative path.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use bytes::BytesMut;
use futures::stream::{self, StreamExt};
use tokio::io::AsyncReadExt;

use super::{ObjectMetadata, ObjectStore, StoredObject};
use crate::error::StoreError;

const CHUNK_SIZE: usize = 64 * 1024;

/// Keys are matched byte-for-byte against file names: no percent-decoding, so
/// `my pic.jpg` on disk is only reachable as the key `my pic.jpg`, not `my%20pic.jpg`.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key onto a path under root. Keys that could escape root map to nothing.
    fn resolve(&self, key: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return None;
            }
            path.push(segment);
        }
        Some(path)
    }
}

/// Content type from file extension; None lets the gateway fall back to octet-stream
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "heic" => "image/heic",
        "bmp" => "image/bmp",
        "json" => "application/json",
        _ => return None,
    };
    Some(mime)
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StoreError> {
        let Some(path) = self.resolve(key) else {
            tracing::debug!("Rejected key outside store root: {}", key);
            return Ok(None);
        };

        let meta = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !meta.is_file() {
            return Ok(None);
        }

        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            // Removed between stat and open
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let metadata = ObjectMetadata {
            content_type: content_type_for(&path).map(str::to_string),
            etag: Some(format!("\"{:x}-{:x}\"", meta.len(), mtime)),
            content_length: Some(meta.len()),
        };

        let body = stream::try_unfold(file, |mut file| async move {
            let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
            let n = file.read_buf(&mut buf).await?;
            if n == 0 {
                Ok::<_, std::io::Error>(None)
            } else {
                Ok(Some((buf.freeze(), file)))
            }
        })
        .boxed();

        Ok(Some(StoredObject { body, metadata }))
    }

    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut pending: Vec<(PathBuf, String)> = vec![(self.root.clone(), String::new())];

        while let Some((dir, dir_key)) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                let key = format!("{}{}", dir_key, name);
                let file_type = entry.file_type().await?;

                if file_type.is_dir() {
                    let child = format!("{}/", key);
                    // Only descend where the prefix could still match
                    if child.starts_with(prefix) || prefix.starts_with(&child) {
                        pending.push((entry.path(), child));
                    }
                } else if file_type.is_file() && key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        keys.truncate(limit);
        Ok(keys)
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, key: &str, data: &[u8]) {
        let path = root.join(key);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, data).unwrap();
    }

    async fn read_all(object: StoredObject) -> Vec<u8> {
        let chunks: Vec<_> = object.body.collect().await;
        chunks.into_iter().flat_map(|c| c.unwrap().to_vec()).collect()
    }

    #[tokio::test]
    async fn test_get_reads_file_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "images/2025/12/22/a.jpg", b"jpeg bytes");
        let store = FsStore::new(dir.path());
        assert_eq!(store.root(), dir.path());

        let object = store.get("images/2025/12/22/a.jpg").await.unwrap().unwrap();
        assert_eq!(object.metadata.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(object.metadata.content_length, Some(10));
        let etag = object.metadata.etag.clone().unwrap();
        assert!(etag.starts_with("\"a-"));
        assert_eq!(read_all(object).await, b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_large_file_streams_in_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let data = vec![7u8; CHUNK_SIZE * 2 + 10];
        write(dir.path(), "images/big.bin", &data);
        let store = FsStore::new(dir.path());

        let object = store.get("images/big.bin").await.unwrap().unwrap();
        assert!(object.metadata.content_type.is_none());
        assert_eq!(read_all(object).await, data);
    }

    #[tokio::test]
    async fn test_missing_and_directory_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "images/a.png", b"png");
        let store = FsStore::new(dir.path());

        assert!(store.get("images/missing.png").await.unwrap().is_none());
        assert!(store.get("images").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_traversal_keys_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "secret.txt", b"nope");
        let store = FsStore::new(dir.path().join("images"));

        assert!(store.get("../secret.txt").await.unwrap().is_none());
        assert!(store.get("images//a.png").await.unwrap().is_none());
        assert!(store.get("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_walks_tree() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "images/2025/12/22/b.jpg", b"b");
        write(dir.path(), "images/2025/12/22/a.jpg", b"a");
        write(dir.path(), "images/2025/12/23/c.jpg", b"c");
        write(dir.path(), "other/d.jpg", b"d");
        let store = FsStore::new(dir.path());

        let keys = store.list("images/2025/12/22", 20).await.unwrap();
        assert_eq!(keys, vec!["images/2025/12/22/a.jpg", "images/2025/12/22/b.jpg"]);

        let limited = store.list("images/", 1).await.unwrap();
        assert_eq!(limited, vec!["images/2025/12/22/a.jpg"]);
    }

    #[tokio::test]
    async fn test_encoded_key_is_not_decoded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "images/my pic.jpg", b"spaced");
        write(dir.path(), "images/my%20pic.jpg", b"encoded");
        let store = FsStore::new(dir.path());

        let object = store.get("images/my%20pic.jpg").await.unwrap().unwrap();
        assert_eq!(read_all(object).await, b"encoded");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(content_type_for(Path::new("a.webp")), Some("image/webp"));
        assert_eq!(content_type_for(Path::new("a.xyz")), None);
        assert_eq!(content_type_for(Path::new("noext")), None);
    }
}
