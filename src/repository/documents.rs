//! # Name and document operations
//!
//! `create_document`/`save_document`/`checkout_document` operate on mutable
//! drafts stored under [`Location::Documents`], addressed the same way a
//! citation addresses an immutable one (`tag/version.bali`) but writable
//! in place. `commit_document` is the transition from draft to immutable
//! contract; per the data model, committing also removes the draft.

use std::collections::BTreeMap;

use uuid::Uuid;

use super::{DocumentRepository, RepositoryError, RepositoryResult};
use crate::model::{Citation, Document, Name, Previous};
use crate::notary::Notary;
use crate::storage::{Location, StorageBackend};

/// Either half of the name-or-citation identifier `retrieve_document`
/// accepts.
#[derive(Debug, Clone)]
pub enum DocumentId {
    Name(Name),
    Citation(Citation),
}

fn draft_key(tag: &str, version: &str) -> String {
    format!("{}/{}.bali", tag.trim_start_matches('#'), version)
}

/// Bump a version string at the given level, semantic-version-style:
/// level 1 bumps the first component and truncates the rest; level 2
/// bumps (or appends) the second component, and so on.
pub(crate) fn bump_version(version: &str, level: usize) -> RepositoryResult<String> {
    if level == 0 {
        return Err(RepositoryError::BadRequest("version level must be >= 1".to_string()));
    }
    let prefix: String = version.chars().take_while(|c| !c.is_ascii_digit()).collect();
    let numeric = &version[prefix.len()..];
    let mut components: Vec<u64> = Vec::new();
    for part in numeric.split('.') {
        let n: u64 = part
            .parse()
            .map_err(|_| RepositoryError::BadRequest(format!("not a version string: {version}")))?;
        components.push(n);
    }

    if level <= components.len() {
        components[level - 1] += 1;
        components.truncate(level);
    } else if level == components.len() + 1 {
        components.push(1);
    } else {
        return Err(RepositoryError::BadRequest(format!(
            "cannot bump version {version} to level {level}: gap too large"
        )));
    }

    let joined = components.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(".");
    Ok(format!("{prefix}{joined}"))
}

impl<B: StorageBackend, N: Notary> DocumentRepository<B, N> {
    /// Instantiate a new draft document from a type's template. The type
    /// is itself a name that resolves to the template's contract.
    pub async fn create_document(
        &self,
        doc_type: &Name,
        permissions: impl Into<String>,
        overrides: BTreeMap<String, serde_json::Value>,
    ) -> RepositoryResult<Document> {
        let template_citation = self
            .cache
            .read_name(doc_type)
            .await?
            .ok_or_else(|| RepositoryError::UnknownType(doc_type.to_string()))?;
        let template_contract = self
            .cache
            .read_contract(&template_citation)
            .await?
            .ok_or_else(|| RepositoryError::UnknownType(doc_type.to_string()))?;

        let mut attributes = template_contract.document.attributes.clone();
        for (key, value) in overrides {
            attributes.insert(key, value);
        }

        let tag = format!("#{}", Uuid::new_v4().simple());
        Ok(Document::new(tag, "v1", permissions.into(), doc_type.to_string()).with_attributes(attributes))
    }

    /// Persist a mutable draft, overwriting any existing draft at the same
    /// `(tag, version)`.
    pub async fn save_document(&self, doc: &Document) -> RepositoryResult<()> {
        let key = draft_key(&doc.tag, &doc.version);
        self.cache
            .validated()
            .backend()
            .write(Location::Documents, &key, &doc.to_canonical_bytes(), false)
            .await?;
        Ok(())
    }

    /// Notarize a draft, bind `name` to its citation, and retire the
    /// draft. Refuses if `name` is already bound.
    pub async fn commit_document(&self, name: &Name, doc: Document, certificate: Option<Citation>) -> RepositoryResult<Citation> {
        if self.cache.read_name(name).await?.is_some() {
            return Err(RepositoryError::NameExists(name.to_string()));
        }

        let notary = self.cache.validated().notary();
        let contract = notary.notarize(doc.clone(), certificate)?;
        let citation = self.cache.write_contract(contract).await?;
        self.cache.write_name(name, &citation).await?;

        let key = draft_key(&doc.tag, &doc.version);
        self.cache.validated().backend().delete(Location::Documents, &key).await?;

        Ok(citation)
    }

    /// Fetch the current document by name, and return a fresh draft at the
    /// next version (per `level`), carrying a `$previous` citation back to
    /// the version it was checked out from.
    pub async fn checkout_document(&self, name: &Name, level: usize) -> RepositoryResult<Document> {
        let citation = self.resolve_name(name).await?;
        let contract = self
            .cache
            .read_contract(&citation)
            .await?
            .ok_or_else(|| RepositoryError::Corrupted(citation.to_string()))?;

        let next_version = bump_version(&contract.document.version, level)?;
        let mut draft = contract.document.clone();
        draft.version = next_version;
        draft.previous = Previous::Citation(citation);
        Ok(draft)
    }

    /// Resolve a name or citation to its document.
    pub async fn retrieve_document(&self, id: &DocumentId) -> RepositoryResult<Document> {
        let citation = match id {
            DocumentId::Citation(citation) => citation.clone(),
            DocumentId::Name(name) => self.resolve_name(name).await?,
        };
        let contract = self
            .cache
            .read_contract(&citation)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(citation.to_string()))?;
        Ok(contract.document)
    }

    /// Delete a mutable draft. A no-op if it is already absent.
    pub async fn discard_document(&self, tag: &str, version: &str) -> RepositoryResult<()> {
        let key = draft_key(tag, version);
        self.cache.validated().backend().delete(Location::Documents, &key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notary::ReferenceNotary;
    use crate::storage::MemoryBackend;
    use serde_json::Value;

    fn repo() -> DocumentRepository<MemoryBackend, ReferenceNotary> {
        DocumentRepository::new(MemoryBackend::new(), ReferenceNotary::generate())
    }

    async fn commit_self_signed(
        repo: &DocumentRepository<MemoryBackend, ReferenceNotary>,
        name: &str,
        mut doc: Document,
    ) -> Citation {
        doc.attributes.insert(
            crate::notary::PUBLIC_KEY_ATTRIBUTE.to_string(),
            Value::from(repo.cache().validated().notary().public_key_hex()),
        );
        repo.commit_document(&Name::parse(name).unwrap(), doc, None).await.unwrap()
    }

    #[test]
    fn test_bump_version_level_one_truncates() {
        assert_eq!(bump_version("v1.2.3", 1).unwrap(), "v2");
    }

    #[test]
    fn test_bump_version_level_two_appends() {
        assert_eq!(bump_version("v1", 2).unwrap(), "v1.1");
    }

    #[test]
    fn test_bump_version_rejects_gap() {
        assert!(bump_version("v1", 3).is_err());
    }

    #[tokio::test]
    async fn test_commit_then_retrieve_document() {
        let repo = repo();
        let doc = Document::new("#tag1", "v1", "/bali/permissions/public/v1", "/bali/types/certificate/v1");
        let name = Name::parse("/bali/certificates/tag1/v1").unwrap();
        let citation = commit_self_signed(&repo, name.as_str(), doc.clone()).await;

        let retrieved = repo.retrieve_document(&DocumentId::Citation(citation)).await.unwrap();
        assert_eq!(retrieved.tag, doc.tag);

        let by_name = repo.retrieve_document(&DocumentId::Name(name)).await.unwrap();
        assert_eq!(by_name.tag, doc.tag);
    }

    #[tokio::test]
    async fn test_commit_refuses_existing_name() {
        let repo = repo();
        let doc = Document::new("#tag1", "v1", "/bali/permissions/public/v1", "/bali/types/certificate/v1");
        let name = Name::parse("/bali/certificates/tag1/v1").unwrap();
        commit_self_signed(&repo, name.as_str(), doc.clone()).await;

        let mut second = Document::new("#tag2", "v1", "/bali/permissions/public/v1", "/bali/types/certificate/v1");
        second.attributes.insert(
            crate::notary::PUBLIC_KEY_ATTRIBUTE.to_string(),
            Value::from(repo.cache().validated().notary().public_key_hex()),
        );
        let result = repo.commit_document(&name, second, None).await;
        assert!(matches!(result, Err(RepositoryError::NameExists(_))));
    }

    #[tokio::test]
    async fn test_checkout_bumps_version_and_sets_previous() {
        let repo = repo();
        let doc = Document::new("#tag1", "v1", "/bali/permissions/public/v1", "/bali/types/certificate/v1");
        let name = Name::parse("/bali/certificates/tag1/v1").unwrap();
        commit_self_signed(&repo, name.as_str(), doc).await;

        let draft = repo.checkout_document(&name, 2).await.unwrap();
        assert_eq!(draft.version, "v1.1");
        assert!(matches!(draft.previous, Previous::Citation(_)));
    }

    #[tokio::test]
    async fn test_save_and_discard_document_roundtrip() {
        let repo = repo();
        let doc = Document::new("#draft1", "v1", "/bali/permissions/public/v1", "/bali/types/example/v1");
        repo.save_document(&doc).await.unwrap();
        repo.discard_document("#draft1", "v1").await.unwrap();
        // Discarding twice is a no-op, not an error.
        repo.discard_document("#draft1", "v1").await.unwrap();
    }
}
