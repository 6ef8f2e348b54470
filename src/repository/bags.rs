//! # Bag engine
//!
//! Messages live under `Location::Messages` at
//! `<bag-tag>/<bag-version>/{available,processing}/<digest>.bali`. The
//! backend offers no atomic rename across keys, so the available→processing
//! transition is a read, a delete, and (only if the delete says the key was
//! still there) a write — the delete is the sole point of contention, and
//! "did not exist" always means another worker won.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde_json::Value;

use super::{DocumentRepository, RepositoryError, RepositoryResult};
use crate::model::{BagConfig, Document, Message, Name};
use crate::notary::Notary;
use crate::storage::{Location, StorageBackend};

/// Retry cap for `receive_message`'s claim loop, bounding how long a
/// worker spins against concurrent claimants before giving up for this
/// call (the caller may simply call again).
pub const MAX_RECEIVE_ATTEMPTS: usize = 5;

/// The attribute a leased message is stamped with while `processing`, so
/// the reaper can tell how long it has been held without the backend
/// needing to expose key metadata.
const LEASED_AT_ATTRIBUTE: &str = "$leasedAt";

fn strip_sigil(value: &str) -> &str {
    value.strip_prefix('#').unwrap_or(value)
}

pub(crate) fn bag_prefix(bag_citation: &crate::model::Citation) -> String {
    format!("{}/{}/", strip_sigil(&bag_citation.tag), bag_citation.version)
}

pub(crate) fn available_key(bag_citation: &crate::model::Citation, digest: &str) -> String {
    format!("{}available/{}.bali", bag_prefix(bag_citation), digest)
}

pub(crate) fn processing_key(bag_citation: &crate::model::Citation, digest: &str) -> String {
    format!("{}processing/{}.bali", bag_prefix(bag_citation), digest)
}

/// Bump a message's retry suffix to avoid colliding with its earlier
/// incarnation's citation: `v1` -> `v1-r1` -> `v1-r2`.
pub(crate) fn bump_retry_version(version: &str) -> String {
    match version.rsplit_once("-r") {
        Some((base, n)) if n.chars().all(|c| c.is_ascii_digit()) && !n.is_empty() => {
            let next: u64 = n.parse::<u64>().unwrap_or(0) + 1;
            format!("{base}-r{next}")
        }
        _ => format!("{version}-r1"),
    }
}

impl<B: StorageBackend, N: Notary> DocumentRepository<B, N> {
    async fn bag_citation_and_config(&self, bag: &Name) -> RepositoryResult<(crate::model::Citation, BagConfig)> {
        let citation = self
            .cache
            .read_name(bag)
            .await?
            .ok_or_else(|| RepositoryError::UnknownBag(bag.to_string()))?;
        let contract = self
            .cache
            .read_contract(&citation)
            .await?
            .ok_or_else(|| RepositoryError::UnknownBag(bag.to_string()))?;
        let config = BagConfig::from_document(&contract.document)?;
        Ok((citation, config))
    }

    /// Number of messages currently available in `bag`. Approximate under
    /// concurrent mutation; a capacity hint only, never load-bearing for
    /// correctness.
    pub async fn message_count(&self, bag: &Name) -> RepositoryResult<usize> {
        let (citation, _) = self.bag_citation_and_config(bag).await?;
        let prefix = format!("{}available/", bag_prefix(&citation));
        let keys = self.cache.validated().backend().list(Location::Messages, &prefix).await?;
        Ok(keys.len())
    }

    /// Enqueue a message. Refuses `bag-full` if the advisory capacity
    /// check fails, and `message-exists` if the citation is already
    /// present in either keyspace.
    pub async fn post_message(&self, bag: &Name, document: Document) -> RepositoryResult<crate::model::Citation> {
        let (bag_citation, config) = self.bag_citation_and_config(bag).await?;

        let count = self.message_count(bag).await?;
        if count as u64 >= config.capacity {
            return Err(RepositoryError::BagFull(bag.to_string()));
        }

        let notary = self.cache.validated().notary();
        let msg_citation = notary.cite(&document);
        let backend = self.cache.validated().backend();

        let avail_key = available_key(&bag_citation, &msg_citation.digest);
        let proc_key = processing_key(&bag_citation, &msg_citation.digest);
        if backend.exists(Location::Messages, &avail_key).await? || backend.exists(Location::Messages, &proc_key).await? {
            return Err(RepositoryError::MessageExists(msg_citation.to_string()));
        }

        backend.write(Location::Messages, &avail_key, &document.to_canonical_bytes(), true).await?;
        Ok(msg_citation)
    }

    /// Claim one message from `bag`, or `None` if the bag is currently
    /// empty. Picks a random candidate and races to delete it out of
    /// `available/`; losing the race is not an error, just a retry.
    pub async fn receive_message(&self, bag: &Name) -> RepositoryResult<Option<Message>> {
        let (bag_citation, _) = self.bag_citation_and_config(bag).await?;
        let backend = self.cache.validated().backend();
        let avail_prefix = format!("{}available/", bag_prefix(&bag_citation));

        for _ in 0..MAX_RECEIVE_ATTEMPTS {
            let keys = backend.list(Location::Messages, &avail_prefix).await?;
            if keys.is_empty() {
                return Ok(None);
            }
            let chosen = keys.choose(&mut rand::thread_rng()).expect("keys is non-empty").clone();

            let bytes = match backend.read(Location::Messages, &chosen).await? {
                Some(bytes) => bytes,
                None => continue, // raced a deleter between list and read
            };
            let existed = backend.delete(Location::Messages, &chosen).await?;
            if !existed {
                continue; // another worker won the claim
            }

            let document = Document::from_bytes(&bytes)?;
            let digest = chosen
                .rsplit('/')
                .next()
                .and_then(|f| f.strip_suffix(".bali"))
                .unwrap_or_default();
            let proc_key = processing_key(&bag_citation, digest);

            let mut leased = document.clone();
            leased.attributes.insert(LEASED_AT_ATTRIBUTE.to_string(), Value::from(now_rfc3339()));
            backend.write(Location::Messages, &proc_key, &leased.to_canonical_bytes(), false).await?;

            return Ok(Some(Message::new(document, bag.clone())));
        }
        Ok(None)
    }

    /// Release a held message back to `available/` under a bumped
    /// version (so its citation does not collide with its prior
    /// incarnation). `lease-expired` if this worker no longer holds it.
    pub async fn reject_message(&self, msg: &Message) -> RepositoryResult<crate::model::Citation> {
        let (bag_citation, _) = self.bag_citation_and_config(&msg.bag).await?;
        let notary = self.cache.validated().notary();
        let citation = notary.cite(&msg.document);
        let backend = self.cache.validated().backend();

        let proc_key = processing_key(&bag_citation, &citation.digest);
        let existed = backend.delete(Location::Messages, &proc_key).await?;
        if !existed {
            return Err(RepositoryError::LeaseExpired);
        }

        let mut republished = msg.document.clone();
        republished.version = bump_retry_version(&republished.version);
        let new_citation = notary.cite(&republished);
        let avail_key = available_key(&bag_citation, &new_citation.digest);
        backend.write(Location::Messages, &avail_key, &republished.to_canonical_bytes(), true).await?;
        Ok(new_citation)
    }

    /// Permanently remove a held message. `lease-expired` if this worker
    /// no longer holds it.
    pub async fn accept_message(&self, msg: &Message) -> RepositoryResult<()> {
        let notary = self.cache.validated().notary();
        let digest = notary.cite(&msg.document).digest;
        self.accept_message_by_digest(&msg.bag, &digest).await
    }

    /// Accept by the held message's citation digest alone, for callers
    /// (e.g. the HTTP `messages` handler) that address the lease by
    /// citation rather than holding the full document.
    pub async fn accept_message_by_digest(&self, bag: &Name, digest: &str) -> RepositoryResult<()> {
        let (bag_citation, _) = self.bag_citation_and_config(bag).await?;
        let proc_key = processing_key(&bag_citation, digest);

        let existed = self.cache.validated().backend().delete(Location::Messages, &proc_key).await?;
        if !existed {
            return Err(RepositoryError::LeaseExpired);
        }
        Ok(())
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub(crate) fn leased_at(document: &Document) -> Option<DateTime<Utc>> {
    document
        .attribute(LEASED_AT_ATTRIBUTE)
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Name;
    use crate::notary::ReferenceNotary;
    use crate::storage::MemoryBackend;

    async fn bag_repo(capacity: u64, lease_seconds: u64) -> (DocumentRepository<MemoryBackend, ReferenceNotary>, Name) {
        let repo = DocumentRepository::new(MemoryBackend::new(), ReferenceNotary::generate());
        let mut bag_doc = Document::new("#bag1", "v1", "/bali/permissions/public/v1", "/bali/types/bag/v1");
        bag_doc.attributes.insert("$capacity".to_string(), Value::from(capacity));
        bag_doc.attributes.insert("$lease".to_string(), Value::from(lease_seconds));
        bag_doc.attributes.insert(
            crate::notary::PUBLIC_KEY_ATTRIBUTE.to_string(),
            Value::from(repo.cache().validated().notary().public_key_hex()),
        );
        let name = Name::parse("/bali/bags/tasks/v1").unwrap();
        repo.commit_document(&name, bag_doc, None).await.unwrap();
        (repo, name)
    }

    fn task_doc(n: &str) -> Document {
        let mut doc = Document::new(format!("#task-{n}"), "v1", "/bali/permissions/public/v1", "/bali/types/task/v1");
        doc.attributes.insert("label".to_string(), Value::from(n));
        doc
    }

    #[tokio::test]
    async fn test_post_then_receive_roundtrip() {
        let (repo, bag) = bag_repo(10, 60).await;
        repo.post_message(&bag, task_doc("a")).await.unwrap();

        let received = repo.receive_message(&bag).await.unwrap().unwrap();
        assert_eq!(received.document.tag, "#task-a");
        assert_eq!(repo.message_count(&bag).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_receive_from_empty_bag_returns_none() {
        let (repo, bag) = bag_repo(10, 60).await;
        assert!(repo.receive_message(&bag).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_post_message_refuses_when_full() {
        let (repo, bag) = bag_repo(1, 60).await;
        repo.post_message(&bag, task_doc("a")).await.unwrap();
        let result = repo.post_message(&bag, task_doc("b")).await;
        assert!(matches!(result, Err(RepositoryError::BagFull(_))));
    }

    #[tokio::test]
    async fn test_post_message_refuses_duplicate_citation() {
        let (repo, bag) = bag_repo(10, 60).await;
        repo.post_message(&bag, task_doc("a")).await.unwrap();
        let result = repo.post_message(&bag, task_doc("a")).await;
        assert!(matches!(result, Err(RepositoryError::MessageExists(_))));
    }

    #[tokio::test]
    async fn test_accept_then_reject_both_report_lease_expired() {
        let (repo, bag) = bag_repo(10, 60).await;
        repo.post_message(&bag, task_doc("a")).await.unwrap();
        let received = repo.receive_message(&bag).await.unwrap().unwrap();

        repo.accept_message(&received).await.unwrap();
        let result = repo.accept_message(&received).await;
        assert!(matches!(result, Err(RepositoryError::LeaseExpired)));
    }

    #[tokio::test]
    async fn test_reject_republishes_under_bumped_version() {
        let (repo, bag) = bag_repo(10, 60).await;
        repo.post_message(&bag, task_doc("a")).await.unwrap();
        let received = repo.receive_message(&bag).await.unwrap().unwrap();

        repo.reject_message(&received).await.unwrap();
        assert_eq!(repo.message_count(&bag).await.unwrap(), 1);

        let again = repo.receive_message(&bag).await.unwrap().unwrap();
        assert_eq!(again.document.version, "v1-r1");
    }

    #[tokio::test]
    async fn test_publish_event_posts_to_events_bag() {
        let repo = DocumentRepository::new(MemoryBackend::new(), ReferenceNotary::generate());
        let mut events_bag = Document::new("#events", "v1", "/bali/permissions/public/v1", "/bali/types/bag/v1");
        events_bag.attributes.insert("$capacity".to_string(), Value::from(100u64));
        events_bag.attributes.insert("$lease".to_string(), Value::from(60u64));
        events_bag.attributes.insert(
            crate::notary::PUBLIC_KEY_ATTRIBUTE.to_string(),
            Value::from(repo.cache().validated().notary().public_key_hex()),
        );
        repo.commit_document(&Name::parse(super::super::EVENTS_BAG).unwrap(), events_bag, None)
            .await
            .unwrap();

        repo.publish_event(task_doc("event1")).await.unwrap();
        let bag_name = Name::parse(super::super::EVENTS_BAG).unwrap();
        assert_eq!(repo.message_count(&bag_name).await.unwrap(), 1);
    }

    #[test]
    fn test_bump_retry_version_increments_suffix() {
        assert_eq!(bump_retry_version("v1"), "v1-r1");
        assert_eq!(bump_retry_version("v1-r1"), "v1-r2");
    }

    #[test]
    fn test_leased_at_roundtrips_through_document() {
        let mut doc = task_doc("a");
        let stamp = now_rfc3339();
        doc.attributes.insert(LEASED_AT_ATTRIBUTE.to_string(), Value::from(stamp.clone()));
        let parsed = leased_at(&doc).unwrap();
        assert_eq!(parsed.to_rfc3339(), DateTime::parse_from_rfc3339(&stamp).unwrap().to_rfc3339());
    }
}
