//! # Validated Wrapper
//!
//! A pass-through wrapper over a [`StorageBackend`] whose sole additional
//! responsibility is invoking the notary on every contract crossing. It
//! never caches and never reorders; every read path — whether reached by
//! name resolution or a direct citation lookup — runs through the same
//! validation, so the question of whether validation applies is never
//! ambiguous.

mod errors;

pub use errors::{ValidationError, ValidationResult};

use crate::model::{Citation, Contract, Previous};
use crate::notary::Notary;
use crate::storage::{Location, StorageBackend};

/// Wraps a storage backend and a notary to provide citation- and
/// signature-verified contract reads and writes.
#[derive(Debug)]
pub struct ValidatedBackend<B, N> {
    backend: B,
    notary: N,
}

impl<B: StorageBackend, N: Notary> ValidatedBackend<B, N> {
    pub fn new(backend: B, notary: N) -> Self {
        Self { backend, notary }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notary(&self) -> &N {
        &self.notary
    }

    /// Read a contract by citation, verifying the citation matches the
    /// embedded document before returning it.
    pub async fn read_contract(&self, citation: &Citation) -> ValidationResult<Option<Contract>> {
        let key = citation.document_key();
        let bytes = match self.backend.read(Location::Contracts, &key).await? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        let contract = Contract::from_bytes(&bytes).map_err(|_| ValidationError::Corrupted)?;
        if !self.notary.citation_matches(citation, &contract.document) {
            return Err(ValidationError::Corrupted);
        }
        Ok(Some(contract))
    }

    /// Resolve the signing certificate document for a contract: itself, if
    /// self-signed, otherwise the document embedded in the cited prior
    /// contract.
    async fn signing_certificate(&self, contract: &Contract) -> ValidationResult<crate::model::Document> {
        match &contract.certificate {
            None => Ok(contract.document.clone()),
            Some(cert_citation) => {
                let cert_contract = self
                    .read_contract(cert_citation)
                    .await?
                    .ok_or_else(|| ValidationError::UnknownCertificate(cert_citation.to_string()))?;
                Ok(cert_contract.document)
            }
        }
    }

    /// Write a contract: derive its citation, verify its signature against
    /// its signing certificate, recursively validate any `$previous` chain,
    /// then write it immutably.
    pub async fn write_contract(&self, contract: Contract) -> ValidationResult<Citation> {
        let citation = self.notary.cite(&contract.document);
        let signing_cert = self.signing_certificate(&contract).await?;

        if !self.notary.valid_contract(&contract, &signing_cert)? {
            return Err(ValidationError::InvalidSignature);
        }

        if let Previous::Citation(previous_citation) = &contract.document.previous {
            if self.read_contract(previous_citation).await?.is_none() {
                return Err(ValidationError::Corrupted);
            }
        }

        let key = citation.document_key();
        self.backend
            .write(Location::Contracts, &key, &contract.to_canonical_bytes(), true)
            .await?;
        Ok(citation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;
    use crate::notary::ReferenceNotary;
    use crate::storage::MemoryBackend;
    use serde_json::Value;

    #[tokio::test]
    async fn test_self_signed_write_then_read() {
        let notary = ReferenceNotary::generate();
        let backend = ValidatedBackend::new(MemoryBackend::new(), notary);

        let mut cert_doc = Document::new("#cert1", "v1", "/bali/permissions/public/v1", "/bali/types/certificate/v1");
        cert_doc.attributes.insert(
            crate::notary::PUBLIC_KEY_ATTRIBUTE.to_string(),
            Value::from(backend.notary().public_key_hex()),
        );
        let contract = backend.notary().notarize(cert_doc, None).unwrap();

        let citation = backend.write_contract(contract.clone()).await.unwrap();
        let read_back = backend.read_contract(&citation).await.unwrap().unwrap();
        assert_eq!(read_back.document, contract.document);
    }

    #[tokio::test]
    async fn test_corrupted_contract_detected_on_read() {
        let notary = ReferenceNotary::generate();
        let backend = ValidatedBackend::new(MemoryBackend::new(), notary);

        let mut cert_doc = Document::new("#cert1", "v1", "/bali/permissions/public/v1", "/bali/types/certificate/v1");
        cert_doc.attributes.insert(
            crate::notary::PUBLIC_KEY_ATTRIBUTE.to_string(),
            Value::from(backend.notary().public_key_hex()),
        );
        let contract = backend.notary().notarize(cert_doc, None).unwrap();
        let citation = backend.write_contract(contract).await.unwrap();

        // Tamper with the stored bytes directly, bypassing the wrapper.
        let mut tampered = Document::new("#cert1", "v1", "/bali/permissions/public/v1", "/bali/types/certificate/v1");
        tampered.attributes.insert("tampered".to_string(), Value::from(true));
        let tampered_contract = crate::model::Contract::new(tampered, None, "deadbeef", chrono::Utc::now());
        backend
            .backend()
            .write(Location::Contracts, &citation.document_key(), &tampered_contract.to_canonical_bytes(), false)
            .await
            .ok();

        let result = backend.read_contract(&citation).await;
        assert!(matches!(result, Err(ValidationError::Corrupted)));
    }
}
