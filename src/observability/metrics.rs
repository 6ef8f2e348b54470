//! Metrics registry for the document repository
//!
//! - Counters only (no gauges, no histograms)
//! - Monotonic increase
//! - Reset only on process start
//! - Thread-safe but lock-minimal

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics registry containing all operational counters
///
/// All values are exact.
///
/// # Thread Safety
///
/// All counters use atomic operations for thread-safe increments.
/// Uses Relaxed ordering for minimal overhead (eventual consistency is fine for metrics).
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Documents committed
    documents_committed: AtomicU64,
    /// Documents read
    documents_retrieved: AtomicU64,
    /// Document citations that failed validation
    document_validation_failures: AtomicU64,
    /// Names written
    names_written: AtomicU64,
    /// Name resolutions attempted
    names_resolved: AtomicU64,
    /// Contracts notarized
    contracts_notarized: AtomicU64,
    /// Contract signature verification failures
    contract_signature_failures: AtomicU64,
    /// Messages posted to bags
    bag_messages_posted: AtomicU64,
    /// Messages received (leased) from bags
    bag_messages_received: AtomicU64,
    /// Messages deleted (acknowledged) from bags
    bag_messages_deleted: AtomicU64,
    /// Leases reclaimed by the reaper after expiry
    bag_leases_expired: AtomicU64,
    /// Cache hits
    cache_hits: AtomicU64,
    /// Cache misses
    cache_misses: AtomicU64,
    /// Cache evictions
    cache_evictions: AtomicU64,
    /// Current count of distinct documents stored
    documents: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Document metrics

    /// Increment documents committed
    pub fn increment_documents_committed(&self) {
        self.documents_committed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment documents retrieved
    pub fn increment_documents_retrieved(&self) {
        self.documents_retrieved.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment document validation failures
    pub fn increment_document_validation_failures(&self) {
        self.document_validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    // Name metrics

    /// Increment names written
    pub fn increment_names_written(&self) {
        self.names_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment name resolutions
    pub fn increment_names_resolved(&self) {
        self.names_resolved.fetch_add(1, Ordering::Relaxed);
    }

    // Contract metrics

    /// Increment contracts notarized
    pub fn increment_contracts_notarized(&self) {
        self.contracts_notarized.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment contract signature failures
    pub fn increment_contract_signature_failures(&self) {
        self.contract_signature_failures.fetch_add(1, Ordering::Relaxed);
    }

    // Bag metrics

    /// Increment messages posted
    pub fn increment_bag_messages_posted(&self) {
        self.bag_messages_posted.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment messages received
    pub fn increment_bag_messages_received(&self) {
        self.bag_messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment messages deleted
    pub fn increment_bag_messages_deleted(&self) {
        self.bag_messages_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment leases reclaimed by the reaper
    pub fn increment_bag_leases_expired(&self) {
        self.bag_leases_expired.fetch_add(1, Ordering::Relaxed);
    }

    // Cache metrics

    /// Increment cache hits
    pub fn increment_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment cache misses
    pub fn increment_cache_misses(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment cache evictions
    pub fn increment_cache_evictions(&self) {
        self.cache_evictions.fetch_add(1, Ordering::Relaxed);
    }

    // Document count

    /// Set document count
    pub fn set_documents(&self, count: u64) {
        self.documents.store(count, Ordering::Relaxed);
    }

    /// Increment document count
    pub fn increment_documents(&self) {
        self.documents.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current snapshot of all metrics as JSON
    ///
    /// Returns exact values.
    pub fn to_json(&self) -> String {
        format!(
            r#"{{"documents_committed":{},"documents_retrieved":{},"document_validation_failures":{},"names_written":{},"names_resolved":{},"contracts_notarized":{},"contract_signature_failures":{},"bag_messages_posted":{},"bag_messages_received":{},"bag_messages_deleted":{},"bag_leases_expired":{},"cache_hits":{},"cache_misses":{},"cache_evictions":{},"documents":{}}}"#,
            self.documents_committed.load(Ordering::Relaxed),
            self.documents_retrieved.load(Ordering::Relaxed),
            self.document_validation_failures.load(Ordering::Relaxed),
            self.names_written.load(Ordering::Relaxed),
            self.names_resolved.load(Ordering::Relaxed),
            self.contracts_notarized.load(Ordering::Relaxed),
            self.contract_signature_failures.load(Ordering::Relaxed),
            self.bag_messages_posted.load(Ordering::Relaxed),
            self.bag_messages_received.load(Ordering::Relaxed),
            self.bag_messages_deleted.load(Ordering::Relaxed),
            self.bag_leases_expired.load(Ordering::Relaxed),
            self.cache_hits.load(Ordering::Relaxed),
            self.cache_misses.load(Ordering::Relaxed),
            self.cache_evictions.load(Ordering::Relaxed),
            self.documents.load(Ordering::Relaxed),
        )
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_committed: self.documents_committed.load(Ordering::Relaxed),
            documents_retrieved: self.documents_retrieved.load(Ordering::Relaxed),
            document_validation_failures: self.document_validation_failures.load(Ordering::Relaxed),
            names_written: self.names_written.load(Ordering::Relaxed),
            names_resolved: self.names_resolved.load(Ordering::Relaxed),
            contracts_notarized: self.contracts_notarized.load(Ordering::Relaxed),
            contract_signature_failures: self.contract_signature_failures.load(Ordering::Relaxed),
            bag_messages_posted: self.bag_messages_posted.load(Ordering::Relaxed),
            bag_messages_received: self.bag_messages_received.load(Ordering::Relaxed),
            bag_messages_deleted: self.bag_messages_deleted.load(Ordering::Relaxed),
            bag_leases_expired: self.bag_leases_expired.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_evictions: self.cache_evictions.load(Ordering::Relaxed),
            documents: self.documents.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub documents_committed: u64,
    pub documents_retrieved: u64,
    pub document_validation_failures: u64,
    pub names_written: u64,
    pub names_resolved: u64,
    pub contracts_notarized: u64,
    pub contract_signature_failures: u64,
    pub bag_messages_posted: u64,
    pub bag_messages_received: u64,
    pub bag_messages_deleted: u64,
    pub bag_leases_expired: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_evictions: u64,
    pub documents: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let registry = MetricsRegistry::new();
        let snapshot = registry.snapshot();

        assert_eq!(snapshot.documents_committed, 0);
        assert_eq!(snapshot.bag_messages_posted, 0);
        assert_eq!(snapshot.cache_hits, 0);
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_documents_committed();
        registry.increment_documents_committed();
        registry.increment_names_written();
        registry.increment_contracts_notarized();
        registry.increment_bag_messages_posted();
        registry.increment_bag_messages_received();
        registry.increment_bag_messages_deleted();
        registry.increment_bag_leases_expired();
        registry.increment_cache_hits();
        registry.increment_cache_misses();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.documents_committed, 2);
        assert_eq!(snapshot.names_written, 1);
        assert_eq!(snapshot.contracts_notarized, 1);
        assert_eq!(snapshot.bag_messages_posted, 1);
        assert_eq!(snapshot.bag_messages_received, 1);
        assert_eq!(snapshot.bag_messages_deleted, 1);
        assert_eq!(snapshot.bag_leases_expired, 1);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.cache_misses, 1);
    }

    #[test]
    fn test_document_count() {
        let registry = MetricsRegistry::new();

        registry.set_documents(100);
        assert_eq!(registry.snapshot().documents, 100);

        registry.increment_documents();
        assert_eq!(registry.snapshot().documents, 101);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.increment_documents_committed();
        registry.increment_bag_messages_posted();

        let json = registry.to_json();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["documents_committed"], 1);
        assert_eq!(parsed["bag_messages_posted"], 1);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_documents_committed();
                    reg.increment_bag_messages_received();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.documents_committed, 1000);
        assert_eq!(snapshot.bag_messages_received, 1000);
    }

    #[test]
    fn test_monotonic_increase() {
        let registry = MetricsRegistry::new();

        let mut prev = registry.snapshot().documents_committed;
        for _ in 0..10 {
            registry.increment_documents_committed();
            let current = registry.snapshot().documents_committed;
            assert!(current >= prev);
            prev = current;
        }
    }
}
