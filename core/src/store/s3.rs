//! S3-compatible object store (Cloudflare R2 in production)

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::Client;
use futures::stream::{self, StreamExt};

use super::{ObjectMetadata, ObjectStore, StoredObject};
use crate::config::S3StoreConfig;
use crate::error::StoreError;

#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client from configuration.
    /// Falls back to the default AWS credential chain when no keys are configured.
    pub async fn connect(config: &S3StoreConfig) -> anyhow::Result<Self> {
        if config.bucket.is_empty() {
            anyhow::bail!("S3 store requires a bucket name (store.s3.bucket or R2_BUCKET_NAME)");
        }

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "image_gateway_config",
            );
            loader = loader.credentials_provider(credentials);
        }

        if let Some(endpoint) = &config.endpoint {
            tracing::info!("Using S3 endpoint: {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }

        let shared = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.force_path_style)
            .build();

        Ok(Self::new(Client::from_conf(s3_config), config.bucket.clone()))
    }

    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StoreError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return Ok(None);
                }
                return Err(StoreError::Backend(e.to_string()));
            }
        };

        let metadata = ObjectMetadata {
            content_type: output.content_type().map(str::to_string),
            etag: output.e_tag().map(str::to_string),
            content_length: output.content_length().and_then(|len| u64::try_from(len).ok()),
        };

        let body = stream::unfold(output.body, |mut body| async move {
            body.next()
                .await
                .map(|chunk| (chunk.map_err(std::io::Error::other), body))
        })
        .boxed();

        Ok(Some(StoredObject { body, metadata }))
    }

    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        let max_keys = i32::try_from(limit).unwrap_or(i32::MAX);
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut keys: Vec<String> = response
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(|k| k.to_string()))
            .collect();
        keys.sort();
        keys.truncate(limit);
        Ok(keys)
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const NO_SUCH_KEY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message><Key>images/missing.jpg</Key><RequestId>req-1</RequestId></Error>"#;

    const LIST_RESULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Name>media</Name><Prefix>images/2025/12/22</Prefix><KeyCount>2</KeyCount><MaxKeys>20</MaxKeys><IsTruncated>false</IsTruncated><Contents><Key>images/2025/12/22/b.jpg</Key><Size>1</Size></Contents><Contents><Key>images/2025/12/22/a.jpg</Key><Size>12</Size></Contents></ListBucketResult>"#;

    fn http_response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut out = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            status,
            body.len()
        );
        for (name, value) in headers {
            out.push_str(&format!("{}: {}\r\n", name, value));
        }
        out.push_str("\r\n");
        out.push_str(body);
        out
    }

    /// Path-style answers for a bucket named `media` holding one object
    fn r2_response(path: &str, query: &str) -> String {
        match path {
            "/media/images/2025/12/22/a.jpg" => http_response(
                "200 OK",
                &[("Content-Type", "image/jpeg"), ("ETag", "\"abc\"")],
                "jpeg payload",
            ),
            "/media" | "/media/" if query.contains("list-type=2") => {
                http_response("200 OK", &[("Content-Type", "application/xml")], LIST_RESULT)
            }
            _ => http_response("404 Not Found", &[("Content-Type", "application/xml")], NO_SUCH_KEY),
        }
    }

    /// Local HTTP listener standing in for an R2 endpoint; returns its URL
    async fn spawn_local_r2() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 4096];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }

                    let head = String::from_utf8_lossy(&buf).to_string();
                    let target = head.split_whitespace().nth(1).unwrap_or("/");
                    let (path, query) = target.split_once('?').unwrap_or((target, ""));
                    let response = r2_response(path, query);

                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    fn local_config(endpoint: String) -> S3StoreConfig {
        S3StoreConfig {
            bucket: "media".to_string(),
            endpoint: Some(endpoint),
            access_key_id: Some("test".to_string()),
            secret_access_key: Some("test".to_string()),
            force_path_style: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_get_streams_body_with_metadata() {
        let store = S3Store::connect(&local_config(spawn_local_r2().await)).await.unwrap();

        let object = store.get("images/2025/12/22/a.jpg").await.unwrap().unwrap();
        assert_eq!(object.metadata.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(object.metadata.etag.as_deref(), Some("\"abc\""));
        assert_eq!(object.metadata.content_length, Some(12));

        let chunks: Vec<_> = object.body.collect().await;
        let data: Vec<u8> = chunks.into_iter().flat_map(|c| c.unwrap().to_vec()).collect();
        assert_eq!(data, b"jpeg payload");
    }

    #[tokio::test]
    async fn test_no_such_key_is_absent() {
        let store = S3Store::connect(&local_config(spawn_local_r2().await)).await.unwrap();

        let result = store.get("images/missing.jpg").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_returns_sorted_keys() {
        let store = S3Store::connect(&local_config(spawn_local_r2().await)).await.unwrap();

        let keys = store.list("images/2025/12/22", 20).await.unwrap();
        assert_eq!(keys, vec!["images/2025/12/22/a.jpg", "images/2025/12/22/b.jpg"]);

        let limited = store.list("images/2025/12/22", 1).await.unwrap();
        assert_eq!(limited, vec!["images/2025/12/22/a.jpg"]);
    }

    #[tokio::test]
    async fn test_connect_requires_bucket() {
        let config = S3StoreConfig::default();
        let err = S3Store::connect(&config).await.err().unwrap();
        assert!(err.to_string().contains("bucket"));
    }

    #[tokio::test]
    async fn test_connect_with_explicit_endpoint() {
        let config = S3StoreConfig {
            bucket: "images".to_string(),
            endpoint: Some("http://127.0.0.1:9".to_string()),
            access_key_id: Some("test".to_string()),
            secret_access_key: Some("test".to_string()),
            force_path_style: true,
            ..Default::default()
        };
        let store = S3Store::connect(&config).await.unwrap();
        assert_eq!(store.bucket(), "images");
        assert_eq!(store.name(), "s3");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_backend_error() {
        let config = S3StoreConfig {
            bucket: "images".to_string(),
            endpoint: Some("http://127.0.0.1:9".to_string()),
            access_key_id: Some("test".to_string()),
            secret_access_key: Some("test".to_string()),
            force_path_style: true,
            ..Default::default()
        };
        let store = S3Store::connect(&config).await.unwrap();
        let result = store.get("images/a.jpg").await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }
}
