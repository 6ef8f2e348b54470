//! # Remote backend
//!
//! Forwards operations as HTTP requests to another instance of this
//! system. Bytes on the wire are the canonical document serialization plus
//! the trailing-EOL sentinel; this backend does no deserialization of its
//! own, it passes bytes through.

use reqwest::{Client, StatusCode};

use super::errors::{StorageError, StorageResult};
use super::{Location, StorageBackend};

/// Storage backed by a peer repository instance, reached over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    peer_base_url: String,
}

impl RemoteBackend {
    pub fn new(peer_base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            peer_base_url: peer_base_url.into(),
        }
    }

    fn url(&self, location: Location, key: &str) -> String {
        format!("{}/{}/{}", self.peer_base_url, location.as_str(), key)
    }

    fn transport_err(e: reqwest::Error) -> StorageError {
        StorageError::Backend(e.to_string())
    }
}

#[async_trait::async_trait]
impl StorageBackend for RemoteBackend {
    async fn exists(&self, location: Location, key: &str) -> StorageResult<bool> {
        let response = self
            .client
            .head(self.url(location, key))
            .send()
            .await
            .map_err(Self::transport_err)?;
        Ok(response.status().is_success())
    }

    async fn read(&self, location: Location, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let response = self
            .client
            .get(self.url(location, key))
            .send()
            .await
            .map_err(Self::transport_err)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        response
            .error_for_status_ref()
            .map_err(Self::transport_err)?;
        let bytes = response.bytes().await.map_err(Self::transport_err)?;
        Ok(Some(bytes.to_vec()))
    }

    async fn write(&self, location: Location, key: &str, data: &[u8], immutable: bool) -> StorageResult<()> {
        let response = self
            .client
            .put(self.url(location, key))
            .body(data.to_vec())
            .send()
            .await
            .map_err(Self::transport_err)?;
        if response.status() == StatusCode::CONFLICT && immutable {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        response.error_for_status().map_err(Self::transport_err)?;
        Ok(())
    }

    async fn delete(&self, location: Location, key: &str) -> StorageResult<bool> {
        let response = self
            .client
            .delete(self.url(location, key))
            .send()
            .await
            .map_err(Self::transport_err)?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(StorageError::Backend(format!("delete failed: {}", status))),
        }
    }

    async fn list(&self, location: Location, prefix: &str) -> StorageResult<Vec<String>> {
        let response = self
            .client
            .get(format!("{}?prefix={}", self.url(location, ""), prefix))
            .send()
            .await
            .map_err(Self::transport_err)?;
        let keys: Vec<String> = response.json().await.map_err(Self::transport_err)?;
        Ok(keys)
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
        let existed = self.delete(location, src_key).await?;
        Ok(existed)
    }
}
