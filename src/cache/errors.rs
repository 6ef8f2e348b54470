//! # Cache Wrapper Errors

use thiserror::Error;

use crate::storage::StorageError;
use crate::validated::ValidationError;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("name already exists: {0}")]
    NameAlreadyExists(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CacheError {
    pub fn status_code(&self) -> u16 {
        match self {
            CacheError::NameAlreadyExists(_) => 409,
            CacheError::Validation(e) => e.status_code(),
            CacheError::Storage(e) => e.status_code(),
        }
    }
}
