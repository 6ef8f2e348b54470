//! # Validated Wrapper Errors

use thiserror::Error;

use crate::notary::NotaryError;
use crate::storage::StorageError;

pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("citation does not match document")]
    Corrupted,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("unknown signing certificate: {0}")]
    UnknownCertificate(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Notary(#[from] NotaryError),
}

impl ValidationError {
    pub fn status_code(&self) -> u16 {
        match self {
            ValidationError::Corrupted => 409,
            ValidationError::InvalidSignature => 409,
            ValidationError::UnknownCertificate(_) => 404,
            ValidationError::Storage(e) => e.status_code(),
            ValidationError::Notary(_) => 400,
        }
    }
}
