//! # Repository Errors
//!
//! One error enum unifying every lower-layer failure, enriched with the
//! operation context the repository adds before re-raising. Lower-layer
//! errors convert in via `From` so context is added without boxing away
//! the original kind, via pass-through conversions.

use thiserror::Error;

use crate::cache::CacheError;
use crate::model::ModelError;
use crate::notary::NotaryError;
use crate::storage::StorageError;
use crate::validated::ValidationError;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("name already exists: {0}")]
    NameExists(String),

    #[error("citation does not match document, or signature invalid: {0}")]
    Corrupted(String),

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("unknown name: {0}")]
    UnknownName(String),

    #[error("unknown bag: {0}")]
    UnknownBag(String),

    #[error("bag is full: {0}")]
    BagFull(String),

    #[error("message already exists: {0}")]
    MessageExists(String),

    #[error("lease expired or message not held")]
    LeaseExpired,

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("unauthorized")]
    Unauthorized,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    pub fn status_code(&self) -> u16 {
        match self {
            RepositoryError::NotFound(_) => 404,
            RepositoryError::AlreadyExists(_) => 409,
            RepositoryError::NameExists(_) => 409,
            RepositoryError::Corrupted(_) => 409,
            RepositoryError::UnknownType(_) => 404,
            RepositoryError::UnknownName(_) => 404,
            RepositoryError::UnknownBag(_) => 404,
            RepositoryError::BagFull(_) => 409,
            RepositoryError::MessageExists(_) => 409,
            RepositoryError::LeaseExpired => 409,
            RepositoryError::Unauthenticated => 401,
            RepositoryError::Unauthorized => 403,
            RepositoryError::BadRequest(_) => 400,
            RepositoryError::Backend(_) => 500,
        }
    }
}

impl From<StorageError> for RepositoryError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::AlreadyExists(key) => RepositoryError::AlreadyExists(key),
            StorageError::BadRequest(msg) => RepositoryError::BadRequest(msg),
            StorageError::Backend(msg) => RepositoryError::Backend(msg),
        }
    }
}

impl From<ValidationError> for RepositoryError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::Corrupted => RepositoryError::Corrupted("citation/document mismatch".to_string()),
            ValidationError::InvalidSignature => RepositoryError::Corrupted("invalid signature".to_string()),
            ValidationError::UnknownCertificate(cit) => RepositoryError::UnknownName(cit),
            ValidationError::Storage(inner) => inner.into(),
            ValidationError::Notary(inner) => inner.into(),
        }
    }
}

impl From<CacheError> for RepositoryError {
    fn from(e: CacheError) -> Self {
        match e {
            CacheError::NameAlreadyExists(name) => RepositoryError::NameExists(name),
            CacheError::Validation(inner) => inner.into(),
            CacheError::Storage(inner) => inner.into(),
        }
    }
}

impl From<ModelError> for RepositoryError {
    fn from(e: ModelError) -> Self {
        RepositoryError::BadRequest(e.to_string())
    }
}

impl From<NotaryError> for RepositoryError {
    fn from(e: NotaryError) -> Self {
        RepositoryError::Corrupted(e.to_string())
    }
}
