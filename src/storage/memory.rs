//! # In-memory backend
//!
//! A fourth, in-process backend for unit tests and for the object-store
//! backend's own test doubles. Not part of the production deployment
//! surface.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::errors::StorageResult;
use super::{Location, StorageBackend, StorageError};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<(Location, String), Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    async fn exists(&self, location: Location, key: &str) -> StorageResult<bool> {
        let entries = self.entries.read().await;
        Ok(entries.contains_key(&(location, key.to_string())))
    }

    async fn read(&self, location: Location, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&(location, key.to_string())).cloned())
    }

    async fn write(&self, location: Location, key: &str, data: &[u8], immutable: bool) -> StorageResult<()> {
        let mut entries = self.entries.write().await;
        let map_key = (location, key.to_string());
        if immutable && entries.contains_key(&map_key) {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        entries.insert(map_key, data.to_vec());
        Ok(())
    }

    async fn delete(&self, location: Location, key: &str) -> StorageResult<bool> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(&(location, key.to_string())).is_some())
    }

    async fn list(&self, location: Location, prefix: &str) -> StorageResult<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .keys()
            .filter(|(loc, key)| *loc == location && key.starts_with(prefix))
            .map(|(_, key)| key.clone())
            .collect())
    }

    async fn move_key(&self, location: Location, src_key: &str, dst_key: &str) -> StorageResult<bool> {
        let mut entries = self.entries.write().await;
        let src = (location, src_key.to_string());
        match entries.remove(&src) {
            Some(data) => {
                entries.insert((location, dst_key.to_string()), data);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_delete() {
        let backend = MemoryBackend::new();
        backend.write(Location::Documents, "a", b"1", false).await.unwrap();
        assert_eq!(backend.read(Location::Documents, "a").await.unwrap(), Some(b"1".to_vec()));
        assert!(backend.delete(Location::Documents, "a").await.unwrap());
        assert_eq!(backend.read(Location::Documents, "a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_immutable_conflict() {
        let backend = MemoryBackend::new();
        backend.write(Location::Contracts, "c", b"1", true).await.unwrap();
        let result = backend.write(Location::Contracts, "c", b"2", true).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_filters_by_location_and_prefix() {
        let backend = MemoryBackend::new();
        backend.write(Location::Messages, "bag/available/m1", b"1", true).await.unwrap();
        backend.write(Location::Documents, "bag/available/m1", b"1", true).await.unwrap();

        let keys = backend.list(Location::Messages, "bag/available").await.unwrap();
        assert_eq!(keys, vec!["bag/available/m1".to_string()]);
    }

    #[tokio::test]
    async fn test_move_key() {
        let backend = MemoryBackend::new();
        backend.write(Location::Messages, "a", b"1", true).await.unwrap();
        assert!(backend.move_key(Location::Messages, "a", "b").await.unwrap());
        assert!(!backend.exists(Location::Messages, "a").await.unwrap());
        assert!(backend.exists(Location::Messages, "b").await.unwrap());
    }
}
