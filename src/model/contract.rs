//! # Contract
//!
//! A notarized document: the embedded document plus the citation of the
//! signing certificate, a signature, and a notarization timestamp. Contracts
//! are immutable once written; the commit transition is removing the
//! matching mutable document from the draft store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::citation::Citation;
use super::document::Document;
use super::errors::{ModelError, ModelResult};

#[derive(Debug, Serialize, Deserialize)]
struct Wire {
    document: String,
    #[serde(rename = "$certificate")]
    certificate: Option<String>,
    #[serde(rename = "$signature")]
    signature: String,
    #[serde(rename = "$timestamp")]
    timestamp: DateTime<Utc>,
}

/// A notarized document.
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    pub document: Document,
    /// Citation of the signing certificate. `None` for a self-signed
    /// certificate contract (the contract's own document is the cert).
    pub certificate: Option<Citation>,
    pub signature: String,
    pub timestamp: DateTime<Utc>,
}

impl Contract {
    pub fn new(document: Document, certificate: Option<Citation>, signature: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            document,
            certificate,
            signature: signature.into(),
            timestamp,
        }
    }

    /// True if this contract is self-signed (no separate signing certificate).
    pub fn is_self_signed(&self) -> bool {
        self.certificate.is_none()
    }

    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let wire = Wire {
            document: String::from_utf8(self.document.to_canonical_bytes())
                .expect("canonical document bytes are always UTF-8"),
            certificate: self.certificate.as_ref().map(|c| c.to_string()),
            signature: self.signature.clone(),
            timestamp: self.timestamp,
        };
        let mut text = serde_json::to_string(&wire).expect("contract is always serializable");
        text.push('\n');
        text.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> ModelResult<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ModelError::MalformedDocument(e.to_string()))?;
        let text = text.strip_suffix('\n').unwrap_or(text);
        let wire: Wire = serde_json::from_str(text)
            .map_err(|e| ModelError::MalformedDocument(e.to_string()))?;
        let certificate = wire
            .certificate
            .as_deref()
            .map(Citation::parse)
            .transpose()?;
        let document = Document::from_bytes(wire.document.as_bytes())?;
        Ok(Self {
            document,
            certificate,
            signature: wire.signature,
            timestamp: wire.timestamp,
        })
    }
}
