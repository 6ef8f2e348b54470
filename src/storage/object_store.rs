//! # Object-store backend
//!
//! Each [`Location`] maps to a bucket; each key is an object. `exists` uses
//! a HEAD request and treats a missing object or zero content-length as
//! non-existent. `list` is cap-limited (64 keys per call) and paginates
//! only as needed via a continuation token. Unlike the filesystem backend,
//! object stores rarely offer atomic rename, so `move_key` is implemented
//! as write-then-delete with the delete fully awaited before the method
//! returns (see the design notes on the source's ordering bug).

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::errors::{StorageError, StorageResult};
use super::{Location, StorageBackend};

const LIST_PAGE_SIZE: usize = 64;

#[derive(Debug, Deserialize)]
struct ListResponse {
    keys: Vec<String>,
    continuation_token: Option<String>,
}

/// Storage backed by an S3-compatible object store, addressed over HTTP.
#[derive(Debug, Clone)]
pub struct ObjectStoreBackend {
    client: Client,
    endpoint: String,
    bucket_prefix: String,
}

impl ObjectStoreBackend {
    pub fn new(endpoint: impl Into<String>, bucket_prefix: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            bucket_prefix: bucket_prefix.into(),
        }
    }

    fn bucket(&self, location: Location) -> String {
        format!("{}-{}", self.bucket_prefix, location.as_str())
    }

    fn object_url(&self, location: Location, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket(location), key)
    }

    fn list_url(&self, location: Location, prefix: &str, continuation_token: Option<&str>) -> String {
        let mut url = format!(
            "{}/{}?prefix={}&max-keys={}",
            self.endpoint,
            self.bucket(location),
            prefix,
            LIST_PAGE_SIZE
        );
        if let Some(token) = continuation_token {
            url.push_str(&format!("&continuation-token={}", token));
        }
        url
    }

    fn transport_err(e: reqwest::Error) -> StorageError {
        StorageError::Backend(e.to_string())
    }
}

#[async_trait::async_trait]
impl StorageBackend for ObjectStoreBackend {
    async fn exists(&self, location: Location, key: &str) -> StorageResult<bool> {
        let response = self
            .client
            .head(self.object_url(location, key))
            .send()
            .await
            .map_err(Self::transport_err)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let len = response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        Ok(response.status().is_success() && len > 0)
    }

    async fn read(&self, location: Location, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let response = self
            .client
            .get(self.object_url(location, key))
            .send()
            .await
            .map_err(Self::transport_err)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let bytes = response.bytes().await.map_err(Self::transport_err)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(bytes.to_vec()))
    }

    async fn write(&self, location: Location, key: &str, data: &[u8], immutable: bool) -> StorageResult<()> {
        if immutable && self.exists(location, key).await? {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        self.client
            .put(self.object_url(location, key))
            .body(data.to_vec())
            .send()
            .await
            .map_err(Self::transport_err)?
            .error_for_status()
            .map_err(Self::transport_err)?;
        Ok(())
    }

    async fn delete(&self, location: Location, key: &str) -> StorageResult<bool> {
        let existed = self.exists(location, key).await?;
        let response = self
            .client
            .delete(self.object_url(location, key))
            .send()
            .await
            .map_err(Self::transport_err)?;
        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            return Err(StorageError::Backend(format!("delete failed: {}", response.status())));
        }
        Ok(existed)
    }

    async fn list(&self, location: Location, prefix: &str) -> StorageResult<Vec<String>> {
        let mut all_keys = Vec::new();
        let mut continuation_token: Option<String> = None;
        loop {
            let url = self.list_url(location, prefix, continuation_token.as_deref());
            let response = self.client.get(url).send().await.map_err(Self::transport_err)?;
            let parsed: ListResponse = response.json().await.map_err(Self::transport_err)?;
            all_keys.extend(parsed.keys);
            match parsed.continuation_token {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }
        Ok(all_keys)
    }

    async fn move_key(&self, location: Location, src_key: &str, dst_key: &str) -> StorageResult<bool> {
        let data = match self.read(location, src_key).await? {
            Some(data) => data,
            None => return Ok(false),
        };
        self.write(location, dst_key, &data, true).await.or_else(|e| match e {
            StorageError::AlreadyExists(_) => Ok(()),
            other => Err(other),
        })?;
        // Await the delete fully before resolving, per the corrected
        // ordering: a "did not exist" here means another worker already
        // won this move, and we report moved = false rather than an error.
        let existed = self.delete(location, src_key).await?;
        Ok(existed)
    }
}
