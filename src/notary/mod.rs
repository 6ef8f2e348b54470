//! # Notary
//!
//! The cryptographic notary is consumed through a fixed trait:
//! `cite`, `notarize`, `citation_matches`, `valid_contract`, `certificate`.
//! This module also ships one reference implementation (Ed25519 signatures
//! over a SHA-256 document digest) so the repository is runnable end-to-end
//! without a separately-shipped notary product; the trait remains swappable.

mod errors;
mod reference;

pub use errors::NotaryError;
pub use reference::{ReferenceNotary, PUBLIC_KEY_ATTRIBUTE};

use crate::model::{Citation, Contract, Document};

/// The notary capability: citing, notarizing, and verifying documents.
///
/// Implementations must be safe to share across requests (`Send + Sync`);
/// the reference implementation holds only a keypair and a protocol string,
/// both cheap to clone behind an `Arc`.
pub trait Notary: Send + Sync + std::fmt::Debug {
    /// Produce the citation for a document: `(protocol, tag, version, digest)`.
    fn cite(&self, document: &Document) -> Citation;

    /// Sign a document, producing a notarized contract. `certificate` is
    /// `None` for self-signed certificate documents.
    fn notarize(&self, document: Document, certificate: Option<Citation>) -> Result<Contract, NotaryError>;

    /// True if `citation` is exactly the citation that `cite(document)`
    /// would produce (i.e. the digest matches).
    fn citation_matches(&self, citation: &Citation, document: &Document) -> bool {
        self.cite(document) == *citation
    }

    /// Verify a contract's signature against the document embedded in the
    /// signing certificate's contract.
    fn valid_contract(&self, contract: &Contract, signing_certificate: &Document) -> Result<bool, NotaryError>;

    /// The protocol identifier this notary stamps on citations it produces.
    fn certificate(&self) -> &str;
}
