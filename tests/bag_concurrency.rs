//! Cross-layer bag-engine scenarios: the full capacity/receive/reject/
//! accept lifecycle, concurrent claimants racing over the same bag, and
//! the reaper reclaiming an expired lease.

use std::sync::Arc;
use std::time::Duration;

use nebula_repository::model::{Document, Name};
use nebula_repository::notary::{ReferenceNotary, PUBLIC_KEY_ATTRIBUTE};
use nebula_repository::repository::{DocumentRepository, Reaper, RepositoryError};
use nebula_repository::storage::MemoryBackend;
use serde_json::Value;

fn task_doc(label: &str) -> Document {
    let mut doc = Document::new(format!("#task-{label}"), "v1", "/bali/permissions/public/v1", "/bali/types/task/v1");
    doc.attributes.insert("label".to_string(), Value::from(label));
    doc
}

async fn bag_repo(capacity: u64, lease_seconds: u64) -> (Arc<DocumentRepository<MemoryBackend, ReferenceNotary>>, Name) {
    let repo = Arc::new(DocumentRepository::new(MemoryBackend::new(), ReferenceNotary::generate()));
    let mut bag_doc = Document::new("#tasks-bag", "v1", "/bali/permissions/public/v1", "/bali/types/bag/v1");
    bag_doc.attributes.insert("$capacity".to_string(), Value::from(capacity));
    bag_doc.attributes.insert("$lease".to_string(), Value::from(lease_seconds));
    bag_doc.attributes.insert(PUBLIC_KEY_ATTRIBUTE.to_string(), Value::from(repo.cache().validated().notary().public_key_hex()));
    let name = Name::parse("/bali/bags/tasks/v1").unwrap();
    repo.commit_document(&name, bag_doc, None).await.unwrap();
    (repo, name)
}

#[tokio::test]
async fn test_full_bag_lifecycle_round_trip() {
    let (repo, bag) = bag_repo(3, 60).await;

    repo.post_message(&bag, task_doc("a")).await.unwrap();
    repo.post_message(&bag, task_doc("b")).await.unwrap();
    repo.post_message(&bag, task_doc("c")).await.unwrap();
    let overflow = repo.post_message(&bag, task_doc("d")).await;
    assert!(matches!(overflow, Err(RepositoryError::BagFull(_))));

    let first = repo.receive_message(&bag).await.unwrap().unwrap();
    repo.reject_message(&first).await.unwrap();
    assert_eq!(repo.message_count(&bag).await.unwrap(), 3);

    let second = repo.receive_message(&bag).await.unwrap().unwrap();
    repo.accept_message(&second).await.unwrap();
    assert_eq!(repo.message_count(&bag).await.unwrap(), 2);

    repo.receive_message(&bag).await.unwrap();
    repo.receive_message(&bag).await.unwrap();
    assert!(repo.receive_message(&bag).await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_receivers_never_claim_the_same_message() {
    let (repo, bag) = bag_repo(16, 60).await;
    for i in 0..16 {
        repo.post_message(&bag, task_doc(&i.to_string())).await.unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..16 {
        let repo = repo.clone();
        let bag = bag.clone();
        handles.push(tokio::spawn(async move { repo.receive_message(&bag).await.unwrap() }));
    }

    let mut claimed_tags = std::collections::HashSet::new();
    for handle in handles {
        if let Some(message) = handle.await.unwrap() {
            // Every concurrent claimant must win a distinct message: the
            // delete-wins race in `receive_message` is the sole point of
            // contention, so no tag can be claimed twice.
            assert!(claimed_tags.insert(message.document.tag.clone()), "duplicate claim of {}", message.document.tag);
        }
    }
    assert_eq!(claimed_tags.len(), 16);
    assert_eq!(repo.message_count(&bag).await.unwrap(), 0);
}

#[tokio::test]
async fn test_reaper_reclaims_expired_lease_back_to_available() {
    let (repo, bag) = bag_repo(5, 0).await; // zero-second lease: immediately expired
    repo.post_message(&bag, task_doc("a")).await.unwrap();
    repo.receive_message(&bag).await.unwrap().unwrap();
    assert_eq!(repo.message_count(&bag).await.unwrap(), 0);

    let reaper = Reaper::new(repo.clone(), vec![bag.clone()], Duration::from_secs(3600));
    let reclaimed = reaper.sweep_once().await;
    assert_eq!(reclaimed, 1);
    assert_eq!(repo.message_count(&bag).await.unwrap(), 1);

    // The reclaimed message is republished under a bumped version so its
    // citation never collides with the original lease's incarnation.
    let again = repo.receive_message(&bag).await.unwrap().unwrap();
    assert_eq!(again.document.version, "v1-r1");
}

#[tokio::test]
async fn test_reaper_leaves_fresh_lease_untouched() {
    let (repo, bag) = bag_repo(5, 3600).await;
    repo.post_message(&bag, task_doc("a")).await.unwrap();
    repo.receive_message(&bag).await.unwrap().unwrap();

    let reaper = Reaper::new(repo.clone(), vec![bag.clone()], Duration::from_secs(3600));
    let reclaimed = reaper.sweep_once().await;
    assert_eq!(reclaimed, 0);
    assert_eq!(repo.message_count(&bag).await.unwrap(), 0);
}
