//! Observability events for the document repository
//!
//! This module defines all observable events that can occur during
//! repository operation. Events are explicit and typed.

use std::fmt;

/// Observable events in the document repository
///
/// These events cover:
/// - Repository lifecycle
/// - Document citation and commit
/// - Name resolution
/// - Contract notarization
/// - Message bag posting / receiving / leasing
/// - HTTP request decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Repository startup begins
    RepositoryStart,
    /// Repository startup complete, ready to serve
    RepositoryReady,
    /// Shutdown initiated
    ShutdownStart,
    /// Shutdown complete
    ShutdownComplete,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Documents
    /// A document was committed under a new citation
    DocumentCommitted,
    /// A document was read by citation
    DocumentRetrieved,
    /// A document citation failed validation (digest/signature mismatch)
    DocumentValidationFailed,
    /// A checkin was rejected because the document already exists
    DocumentAlreadyExists,

    // Names
    /// A name was written (append-only)
    NameWritten,
    /// A name resolution was attempted
    NameResolved,
    /// A name write was rejected because it already exists
    NameAlreadyExists,

    // Contracts
    /// A contract was notarized and committed
    ContractNotarized,
    /// A contract signature failed verification
    ContractSignatureInvalid,

    // Message bags
    /// A message was posted to a bag
    BagMessagePosted,
    /// A message was received (leased) from a bag
    BagMessageReceived,
    /// A leased message was deleted (acknowledged)
    BagMessageDeleted,
    /// A lease expired and the message returned to available
    BagLeaseExpired,
    /// The reaper swept expired leases
    BagReaperSweep,

    // Cache
    /// Cache hit on a read
    CacheHit,
    /// Cache miss on a read, fell through to backend
    CacheMiss,
    /// Cache evicted an entry (FIFO)
    CacheEvicted,

    // HTTP
    /// An HTTP request was decided (see the decision table)
    HttpDecision,
    /// An HTTP request was rejected as unauthenticated
    HttpUnauthenticated,
    /// An HTTP request was rejected as unauthorized
    HttpUnauthorized,

    // Server
    /// Server serving (ready for requests)
    Serving,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RepositoryStart => "REPOSITORY_STARTUP_BEGIN",
            Event::RepositoryReady => "REPOSITORY_STARTUP_COMPLETE",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::DocumentCommitted => "DOCUMENT_COMMIT",
            Event::DocumentRetrieved => "DOCUMENT_RETRIEVE",
            Event::DocumentValidationFailed => "DOCUMENT_VALIDATION_FAILED",
            Event::DocumentAlreadyExists => "DOCUMENT_ALREADY_EXISTS",

            Event::NameWritten => "NAME_WRITE",
            Event::NameResolved => "NAME_RESOLVE",
            Event::NameAlreadyExists => "NAME_ALREADY_EXISTS",

            Event::ContractNotarized => "CONTRACT_NOTARIZE",
            Event::ContractSignatureInvalid => "CONTRACT_SIGNATURE_INVALID",

            Event::BagMessagePosted => "BAG_POST",
            Event::BagMessageReceived => "BAG_RECEIVE",
            Event::BagMessageDeleted => "BAG_DELETE",
            Event::BagLeaseExpired => "BAG_LEASE_EXPIRED",
            Event::BagReaperSweep => "BAG_REAPER_SWEEP",

            Event::CacheHit => "CACHE_HIT",
            Event::CacheMiss => "CACHE_MISS",
            Event::CacheEvicted => "CACHE_EVICTED",

            Event::HttpDecision => "HTTP_DECISION",
            Event::HttpUnauthenticated => "HTTP_UNAUTHENTICATED",
            Event::HttpUnauthorized => "HTTP_UNAUTHORIZED",

            Event::Serving => "REPOSITORY_SERVING",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::DocumentValidationFailed | Event::ContractSignatureInvalid)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::RepositoryStart,
            Event::RepositoryReady,
            Event::ShutdownStart,
            Event::ShutdownComplete,
            Event::ConfigLoaded,
            Event::DocumentCommitted,
            Event::DocumentRetrieved,
            Event::DocumentValidationFailed,
            Event::DocumentAlreadyExists,
            Event::NameWritten,
            Event::NameResolved,
            Event::NameAlreadyExists,
            Event::ContractNotarized,
            Event::ContractSignatureInvalid,
            Event::BagMessagePosted,
            Event::BagMessageReceived,
            Event::BagMessageDeleted,
            Event::BagLeaseExpired,
            Event::BagReaperSweep,
            Event::CacheHit,
            Event::CacheMiss,
            Event::CacheEvicted,
            Event::HttpDecision,
            Event::HttpUnauthenticated,
            Event::HttpUnauthorized,
            Event::Serving,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::DocumentValidationFailed.is_fatal());
        assert!(Event::ContractSignatureInvalid.is_fatal());
        assert!(!Event::RepositoryStart.is_fatal());
        assert!(!Event::DocumentCommitted.is_fatal());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::RepositoryStart), "REPOSITORY_STARTUP_BEGIN");
        assert_eq!(format!("{}", Event::BagMessageReceived), "BAG_RECEIVE");
    }
}
