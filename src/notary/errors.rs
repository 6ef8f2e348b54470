//! # Notary Errors

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NotaryError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("malformed certificate: {0}")]
    MalformedCertificate(String),
}
