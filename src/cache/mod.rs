//! # Cache Wrapper
//!
//! Bounded FIFO cache (default 256 entries per namespace) over the
//! wrapped [`ValidatedBackend`], covering name→citation and contract
//! reads — the two entity classes that are immutable by contract.
//! Messages, drafts, and bag contents are never cached.

mod errors;
mod fifo;

pub use errors::{CacheError, CacheResult};
pub use fifo::FifoCache;

use crate::model::{Citation, Contract, Name};
use crate::notary::Notary;
use crate::storage::{Location, StorageBackend};
use crate::validated::ValidatedBackend;

pub const DEFAULT_CAPACITY: usize = 256;

/// Caches name→citation bindings and citation→contract reads over a
/// validated backend.
#[derive(Debug)]
pub struct CacheWrapper<B, N> {
    validated: ValidatedBackend<B, N>,
    contracts: FifoCache<Citation, Contract>,
    names: FifoCache<Name, Citation>,
}

impl<B: StorageBackend, N: Notary> CacheWrapper<B, N> {
    pub fn new(backend: B, notary: N) -> Self {
        Self::with_capacity(backend, notary, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(backend: B, notary: N, capacity: usize) -> Self {
        Self {
            validated: ValidatedBackend::new(backend, notary),
            contracts: FifoCache::new(capacity),
            names: FifoCache::new(capacity),
        }
    }

    pub fn validated(&self) -> &ValidatedBackend<B, N> {
        &self.validated
    }

    /// Read a contract by citation, consulting the cache first.
    pub async fn read_contract(&self, citation: &Citation) -> CacheResult<Option<Contract>> {
        if let Some(contract) = self.contracts.get(citation) {
            return Ok(Some(contract));
        }
        let contract = self.validated.read_contract(citation).await?;
        if let Some(ref contract) = contract {
            self.contracts.insert(citation.clone(), contract.clone());
        }
        Ok(contract)
    }

    /// Write (and cache) a contract.
    pub async fn write_contract(&self, contract: Contract) -> CacheResult<Citation> {
        let citation = self.validated.write_contract(contract.clone()).await?;
        self.contracts.insert(citation.clone(), contract);
        Ok(citation)
    }

    /// Resolve a name to its citation, consulting the cache first. Names
    /// are append-only, so a cached binding is never stale.
    pub async fn read_name(&self, name: &Name) -> CacheResult<Option<Citation>> {
        if let Some(citation) = self.names.get(name) {
            return Ok(Some(citation));
        }
        let bytes = self.validated.backend().read(Location::Names, &name.storage_key()).await?;
        let citation = match bytes {
            Some(bytes) => Some(parse_citation_bytes(&bytes)?),
            None => None,
        };
        if let Some(ref citation) = citation {
            self.names.insert(name.clone(), citation.clone());
        }
        Ok(citation)
    }

    /// Bind a name to a citation. Fails if the name already exists — names
    /// are write-once.
    pub async fn write_name(&self, name: &Name, citation: &Citation) -> CacheResult<()> {
        let mut bytes = citation.to_string().into_bytes();
        bytes.push(b'\n');
        match self
            .validated
            .backend()
            .write(Location::Names, &name.storage_key(), &bytes, true)
            .await
        {
            Ok(()) => {
                self.names.insert(name.clone(), citation.clone());
                Ok(())
            }
            Err(crate::storage::StorageError::AlreadyExists(_)) => {
                Err(CacheError::NameAlreadyExists(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn parse_citation_bytes(bytes: &[u8]) -> CacheResult<Citation> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| CacheError::Storage(crate::storage::StorageError::BadRequest("non-utf8 name binding".to_string())))?;
    let text = text.strip_suffix('\n').unwrap_or(text);
    Citation::parse(text).map_err(|_| CacheError::Storage(crate::storage::StorageError::BadRequest("malformed citation binding".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;
    use crate::notary::ReferenceNotary;
    use crate::storage::MemoryBackend;
    use serde_json::Value;

    fn self_signed_contract(notary: &ReferenceNotary) -> crate::model::Contract {
        let mut cert_doc = Document::new("#cert1", "v1", "/bali/permissions/public/v1", "/bali/types/certificate/v1");
        cert_doc.attributes.insert(crate::notary::PUBLIC_KEY_ATTRIBUTE.to_string(), Value::from(notary.public_key_hex()));
        notary.notarize(cert_doc, None).unwrap()
    }

    #[tokio::test]
    async fn test_name_binding_is_write_once() {
        let notary = ReferenceNotary::generate();
        let cache = CacheWrapper::new(MemoryBackend::new(), notary);

        let contract = self_signed_contract(cache.validated().notary());
        let citation = cache.write_contract(contract).await.unwrap();

        let name = Name::parse("/bali/certificates/abc/v1").unwrap();
        cache.write_name(&name, &citation).await.unwrap();

        let result = cache.write_name(&name, &citation).await;
        assert!(matches!(result, Err(CacheError::NameAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_cache_idempotence_on_repeated_reads() {
        let notary = ReferenceNotary::generate();
        let cache = CacheWrapper::new(MemoryBackend::new(), notary);

        let contract = self_signed_contract(cache.validated().notary());
        let citation = cache.write_contract(contract).await.unwrap();

        let first = cache.read_contract(&citation).await.unwrap();
        let second = cache.read_contract(&citation).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_name_resolves_to_citation() {
        let notary = ReferenceNotary::generate();
        let cache = CacheWrapper::new(MemoryBackend::new(), notary);

        let contract = self_signed_contract(cache.validated().notary());
        let citation = cache.write_contract(contract).await.unwrap();
        let name = Name::parse("/bali/certificates/abc/v1").unwrap();
        cache.write_name(&name, &citation).await.unwrap();

        let resolved = cache.read_name(&name).await.unwrap();
        assert_eq!(resolved, Some(citation));
    }
}
