//! # Bag configuration
//!
//! A bag is a contract whose document carries `$capacity` and `$lease`
//! parameters. This struct extracts the two values the bag engine needs
//! from that document.

use super::document::Document;
use super::errors::{ModelError, ModelResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BagConfig {
    pub capacity: u64,
    pub lease_seconds: u64,
}

impl BagConfig {
    pub fn new(capacity: u64, lease_seconds: u64) -> Self {
        Self { capacity, lease_seconds }
    }

    /// Extract `$capacity` and `$lease` from a bag's document attributes.
    pub fn from_document(doc: &Document) -> ModelResult<Self> {
        let capacity = doc
            .attribute("$capacity")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ModelError::MissingParameter("$capacity".to_string()))?;
        let lease_seconds = doc
            .attribute("$lease")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ModelError::MissingParameter("$lease".to_string()))?;
        Ok(Self { capacity, lease_seconds })
    }
}
