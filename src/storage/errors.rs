//! # Storage Errors

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage backend errors. Not-found is deliberately absent here; `read`
/// and `delete` signal absence through their return types, not an error
/// variant.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("key already exists: {0}")]
    AlreadyExists(String),

    #[error("backend I/O error: {0}")]
    Backend(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl StorageError {
    pub fn status_code(&self) -> u16 {
        match self {
            StorageError::AlreadyExists(_) => 409,
            StorageError::Backend(_) => 500,
            StorageError::BadRequest(_) => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(StorageError::AlreadyExists("k".into()).status_code(), 409);
        assert_eq!(StorageError::Backend("io".into()).status_code(), 500);
    }
}
