//! # Storage Backend
//!
//! A uniform key/blob operation set implementable over any durable store.
//! Three production backends (filesystem, object-store, remote) plus an
//! in-memory backend for tests all implement [`StorageBackend`].
//!
//! Not-found is never an error here — `read` and `delete` return an
//! `Option`/`bool` rather than signaling `StorageError::NotFound`; only
//! transport/filesystem failures and immutable-write conflicts are errors.

mod errors;
mod filesystem;
mod memory;
mod object_store;
mod remote;

pub use errors::{StorageError, StorageResult};
pub use filesystem::FilesystemBackend;
pub use memory::MemoryBackend;
pub use object_store::ObjectStoreBackend;
pub use remote::RemoteBackend;

/// The logical subdirectory/bucket a key lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Names,
    Documents,
    Contracts,
    Messages,
    Statics,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Names => "names",
            Location::Documents => "documents",
            Location::Contracts => "contracts",
            Location::Messages => "messages",
            Location::Statics => "statics",
        }
    }
}

/// The uniform storage capability set. Implementations must be safe to
/// share across concurrently in-flight requests.
///
/// `#[async_trait]` boxes each method's future as `dyn Future + Send`.
/// Plain `async fn` in a trait leaves the future's `Send`-ness unproven for
/// a generic `B`, which `tokio::spawn` (the reaper) and axum's `Handler`
/// blanket impl (every HTTP handler generic over `B`) both require.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// True if `key` exists under `location`.
    async fn exists(&self, location: Location, key: &str) -> StorageResult<bool>;

    /// Read the bytes at `key`, or `None` if absent. Never errors on
    /// not-found.
    async fn read(&self, location: Location, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Write `data` at `key`. When `immutable` is true, a write to an
    /// already-existing key fails with [`StorageError::AlreadyExists`].
    async fn write(&self, location: Location, key: &str, data: &[u8], immutable: bool) -> StorageResult<()>;

    /// Delete `key`, returning whether it previously existed.
    async fn delete(&self, location: Location, key: &str) -> StorageResult<bool>;

    /// List keys under `prefix`. Eventually consistent; no ordering
    /// promised, and callers must not rely on completeness under
    /// concurrent mutation.
    async fn list(&self, location: Location, prefix: &str) -> StorageResult<Vec<String>>;

    /// Move `src_key` to `dst_key`. Must be atomic enough that at most one
    /// concurrent caller observes `moved = true`; returns `false` (not an
    /// error) when the source was already gone by the time the move
    /// resolved, rather than racing ahead of a concurrent deleter.
    async fn move_key(&self, location: Location, src_key: &str, dst_key: &str) -> StorageResult<bool>;
}
