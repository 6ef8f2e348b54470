//! # Reaper
//!
//! An optional, in-process background sweep: on a fixed interval, lists
//! `processing/` entries per watched bag and republishes any held past
//! their bag's lease window back to `available/`. The repository core
//! stays stateless about lease timers; this is a supervised collaborator
//! task running on a fixed interval rather than a cron-like trigger. It is off by default and
//! never required for correctness — a spurious re-publish is tolerable,
//! since a worker's later accept/reject simply discovers `lease-expired`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use super::bags::{available_key, bag_prefix, bump_retry_version, leased_at};
use super::DocumentRepository;
use crate::model::{BagConfig, Document, Name};
use crate::notary::Notary;
use crate::observability::{log_event_with_fields, Event};
use crate::storage::{Location, StorageBackend};

/// Sweeps the `processing/` keyspace of a fixed set of bags, reclaiming
/// leases that have outlived the bag's configured `$lease` window.
pub struct Reaper<B, N> {
    repository: Arc<DocumentRepository<B, N>>,
    bags: Vec<Name>,
    interval: Duration,
}

impl<B: StorageBackend + 'static, N: Notary + 'static> Reaper<B, N> {
    pub fn new(repository: Arc<DocumentRepository<B, N>>, bags: Vec<Name>, interval: Duration) -> Self {
        Self { repository, bags, interval }
    }

    /// Run one sweep over every watched bag, returning the number of
    /// leases reclaimed.
    pub async fn sweep_once(&self) -> usize {
        let mut reclaimed = 0;
        for bag in &self.bags {
            match self.sweep_bag(bag).await {
                Ok(n) => reclaimed += n,
                Err(_) => continue, // a bag that vanished or errored is skipped this round
            }
        }
        reclaimed
    }

    async fn sweep_bag(&self, bag: &Name) -> super::RepositoryResult<usize> {
        let cache = self.repository.cache();
        let citation = cache.read_name(bag).await?.ok_or_else(|| super::RepositoryError::UnknownBag(bag.to_string()))?;
        let contract = cache
            .read_contract(&citation)
            .await?
            .ok_or_else(|| super::RepositoryError::UnknownBag(bag.to_string()))?;
        let config = BagConfig::from_document(&contract.document)?;

        let backend = cache.validated().backend();
        let prefix = format!("{}processing/", bag_prefix(&citation));
        let keys = backend.list(Location::Messages, &prefix).await?;

        let mut reclaimed = 0;
        let now = Utc::now();
        for key in keys {
            let bytes = match backend.read(Location::Messages, &key).await? {
                Some(bytes) => bytes,
                None => continue,
            };
            let document = match Document::from_bytes(&bytes) {
                Ok(doc) => doc,
                Err(_) => continue,
            };
            let age_exceeded = match leased_at(&document) {
                Some(stamp) => (now - stamp).num_seconds() as u64 >= config.lease_seconds,
                None => true, // no stamp at all is treated as already expired
            };
            if !age_exceeded {
                continue;
            }

            let existed = backend.delete(Location::Messages, &key).await?;
            if !existed {
                continue; // its holder beat the reaper to accept/reject
            }

            let mut republished = document;
            republished.version = bump_retry_version(&republished.version);
            republished.attributes.remove("$leasedAt");
            let notary = cache.validated().notary();
            let new_citation = notary.cite(&republished);
            let avail_key = available_key(&citation, &new_citation.digest);
            backend.write(Location::Messages, &avail_key, &republished.to_canonical_bytes(), true).await.ok();

            log_event_with_fields(Event::BagLeaseExpired, &[("bag", bag.as_str())]);
            reclaimed += 1;
        }
        Ok(reclaimed)
    }

    /// Spawn the sweep loop as a background task, running until the
    /// returned handle is aborted or dropped along with the runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            log_event_with_fields(Event::RepositoryReady, &[("component", "reaper")]);
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                let reclaimed = self.sweep_once().await;
                if reclaimed > 0 {
                    log_event_with_fields(Event::BagReaperSweep, &[("reclaimed", &reclaimed.to_string())]);
                }
            }
        })
    }
}
