//! # Document Repository API
//!
//! The typed, in-process surface over the layered storage stack
//! (backend → validated → cache): name and document lifecycle operations
//! plus the bag engine. This is the layer the HTTP semantics engine and
//! the CLI both call into; neither talks to [`crate::storage`] directly.

mod bags;
mod documents;
mod errors;
mod reaper;

pub use bags::MAX_RECEIVE_ATTEMPTS;
pub use documents::DocumentId;
pub use errors::{RepositoryError, RepositoryResult};
pub use reaper::Reaper;

use crate::cache::CacheWrapper;
use crate::model::Name;
use crate::notary::Notary;
use crate::storage::StorageBackend;

/// The event bag every repository instance publishes to; see
/// [`DocumentRepository::publish_event`].
pub const EVENTS_BAG: &str = "/bali/events/bag/v1";

/// The typed document repository: names, documents, contracts, and bags,
/// all reached through one cached, validated backend.
#[derive(Debug)]
pub struct DocumentRepository<B, N> {
    cache: CacheWrapper<B, N>,
}

impl<B: StorageBackend, N: Notary> DocumentRepository<B, N> {
    pub fn new(backend: B, notary: N) -> Self {
        Self { cache: CacheWrapper::new(backend, notary) }
    }

    pub fn with_cache_capacity(backend: B, notary: N, capacity: usize) -> Self {
        Self { cache: CacheWrapper::with_capacity(backend, notary, capacity) }
    }

    pub fn cache(&self) -> &CacheWrapper<B, N> {
        &self.cache
    }

    /// Resolve a name to its citation, surfacing `unknown-name` rather
    /// than a bare `None` for callers that require it to exist.
    pub(crate) async fn resolve_name(&self, name: &Name) -> RepositoryResult<crate::model::Citation> {
        self.cache
            .read_name(name)
            .await?
            .ok_or_else(|| RepositoryError::UnknownName(name.to_string()))
    }

    /// Shorthand for `post_message(EVENTS_BAG, wrap(event))`.
    pub async fn publish_event(&self, event: crate::model::Document) -> RepositoryResult<crate::model::Citation> {
        let bag = Name::parse(EVENTS_BAG).expect("events bag name is a constant");
        self.post_message(&bag, event).await
    }
}
