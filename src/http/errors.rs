//! # HTTP errors
//!
//! Wraps [`RepositoryError`] with the decode-time failures that never
//! reach the repository layer (undecodable credentials, malformed paths).
//! Bodies are always a canonical error document; backend details never
//! leak into the response.

use thiserror::Error;

use crate::repository::RepositoryError;

#[derive(Debug, Clone, Error)]
pub enum HttpError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),
}

impl HttpError {
    pub fn status_code(&self) -> u16 {
        match self {
            HttpError::Repository(e) => e.status_code(),
            HttpError::BadRequest(_) => 400,
            HttpError::MethodNotAllowed => 405,
            HttpError::UnknownResourceType(_) => 400,
        }
    }

    /// The machine-readable `$exception` tag accompanying the error body.
    pub fn exception_tag(&self) -> &'static str {
        match self {
            HttpError::Repository(RepositoryError::NotFound(_)) => "not-found",
            HttpError::Repository(RepositoryError::AlreadyExists(_)) => "already-exists",
            HttpError::Repository(RepositoryError::NameExists(_)) => "already-exists",
            HttpError::Repository(RepositoryError::Corrupted(_)) => "corrupted",
            HttpError::Repository(RepositoryError::UnknownType(_)) => "unknown-type",
            HttpError::Repository(RepositoryError::UnknownName(_)) => "unknown-name",
            HttpError::Repository(RepositoryError::UnknownBag(_)) => "unknown-bag",
            HttpError::Repository(RepositoryError::BagFull(_)) => "bag-full",
            HttpError::Repository(RepositoryError::MessageExists(_)) => "message-exists",
            HttpError::Repository(RepositoryError::LeaseExpired) => "lease-expired",
            HttpError::Repository(RepositoryError::Unauthenticated) => "unauthenticated",
            HttpError::Repository(RepositoryError::Unauthorized) => "unauthorized",
            HttpError::Repository(RepositoryError::BadRequest(_)) => "bad-request",
            HttpError::Repository(RepositoryError::Backend(_)) => "backend",
            HttpError::BadRequest(_) => "bad-request",
            HttpError::MethodNotAllowed => "bad-request",
            HttpError::UnknownResourceType(_) => "bad-request",
        }
    }
}
