//! # Filesystem backend
//!
//! Bytes on disk under a configured root, one subdirectory per [`Location`].
//! Immutability is enforced by file mode (`0o400`); mutable writes use
//! `0o600`. Directories are created lazily with mode `0o700`. `move_key`
//! uses `rename`, which is atomic on POSIX within a filesystem.

use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tokio::fs;

use super::errors::{StorageError, StorageResult};
use super::{Location, StorageBackend};

/// Storage backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, location: Location, key: &str) -> PathBuf {
        self.root.join(location.as_str()).join(key)
    }

    async fn ensure_parent(path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            let perms = std::fs::Permissions::from_mode(0o700);
            let _ = fs::set_permissions(parent, perms).await;
        }
        Ok(())
    }

    fn io_err(e: io::Error) -> StorageError {
        StorageError::Backend(e.to_string())
    }
}

#[async_trait::async_trait]
impl StorageBackend for FilesystemBackend {
    async fn exists(&self, location: Location, key: &str) -> StorageResult<bool> {
        Ok(fs::metadata(self.path(location, key)).await.is_ok())
    }

    async fn read(&self, location: Location, key: &str) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(self.path(location, key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_err(e)),
        }
    }

    async fn write(&self, location: Location, key: &str, data: &[u8], immutable: bool) -> StorageResult<()> {
        let path = self.path(location, key);
        if immutable && fs::metadata(&path).await.is_ok() {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        Self::ensure_parent(&path).await?;
        fs::write(&path, data).await.map_err(Self::io_err)?;
        let mode = if immutable { 0o400 } else { 0o600 };
        fs::set_permissions(&path, std::fs::Permissions::from_mode(mode))
            .await
            .map_err(Self::io_err)?;
        Ok(())
    }

    async fn delete(&self, location: Location, key: &str) -> StorageResult<bool> {
        let path = self.path(location, key);
        // An immutable (read-only) file still needs its writable bit to be
        // removable on some platforms' semantics; POSIX unlink only needs
        // write permission on the containing directory, so no chmod here.
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::io_err(e)),
        }
    }

    async fn list(&self, location: Location, prefix: &str) -> StorageResult<Vec<String>> {
        let dir = self.path(location, prefix);
        let mut results = Vec::new();
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(results),
            Err(e) => return Err(Self::io_err(e)),
        };
        while let Some(entry) = entries.next_entry().await.map_err(Self::io_err)? {
            if let Some(name) = entry.file_name().to_str() {
                results.push(format!("{}/{}", prefix.trim_end_matches('/'), name));
            }
        }
        Ok(results)
    }

    async fn move_key(&self, location: Location, src_key: &str, dst_key: &str) -> StorageResult<bool> {
        let src = self.path(location, src_key);
        let dst = self.path(location, dst_key);
        if fs::metadata(&src).await.is_err() {
            return Ok(false);
        }
        Self::ensure_parent(&dst).await?;
        match fs::rename(&src, &dst).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::io_err(e)),
        }
    }
}
