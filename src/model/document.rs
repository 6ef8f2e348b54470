//! # Document
//!
//! The mutable working-copy representation. A `Document` becomes part of a
//! `Contract` once notarized; the contract, not the document, is the
//! immutable artifact.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::citation::Citation;
use super::errors::{ModelError, ModelResult};

/// The `$previous` parameter: either a citation to a prior version, or the
/// distinguished "none" marker for a document with no history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Previous {
    None,
    Citation(Citation),
}

impl Previous {
    fn as_json(&self) -> Value {
        match self {
            Previous::None => Value::String("none".to_string()),
            Previous::Citation(cit) => Value::String(cit.to_string()),
        }
    }

    fn from_json(value: &Value) -> ModelResult<Self> {
        match value.as_str() {
            Some("none") => Ok(Previous::None),
            Some(s) => Ok(Previous::Citation(Citation::parse(s)?)),
            None => Err(ModelError::InvalidParameter(
                "previous".to_string(),
                "expected a string".to_string(),
            )),
        }
    }
}

/// A document: fixed parameter fields plus an open attribute bag.
///
/// Serialized form is deterministic UTF-8 text (sorted attribute keys)
/// followed by a single trailing newline, so that the citation digest is
/// reproducible for the same logical content.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub tag: String,
    pub version: String,
    pub permissions: String,
    pub previous: Previous,
    pub doc_type: String,
    pub attributes: BTreeMap<String, Value>,
}

/// On-the-wire shape; field order here is the canonical key order.
#[derive(Debug, Serialize, Deserialize)]
struct Wire {
    #[serde(rename = "$tag")]
    tag: String,
    #[serde(rename = "$version")]
    version: String,
    #[serde(rename = "$permissions")]
    permissions: String,
    #[serde(rename = "$previous")]
    previous: Value,
    #[serde(rename = "$type")]
    doc_type: String,
    #[serde(flatten)]
    attributes: BTreeMap<String, Value>,
}

impl Document {
    /// Create a fresh document with no history.
    pub fn new(tag: impl Into<String>, version: impl Into<String>, permissions: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            version: version.into(),
            permissions: permissions.into(),
            previous: Previous::None,
            doc_type: doc_type.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set the attribute bag, overwriting any existing values.
    pub fn with_attributes(mut self, attributes: BTreeMap<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set `$previous` to a citation.
    pub fn with_previous(mut self, previous: Citation) -> Self {
        self.previous = Previous::Citation(previous);
        self
    }

    /// Read an attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Produce the canonical UTF-8 serialization: stable key order, single
    /// trailing `\n`. This is what gets hashed for citation digests and
    /// written to the backend.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let wire = Wire {
            tag: self.tag.clone(),
            version: self.version.clone(),
            permissions: self.permissions.clone(),
            previous: self.previous.as_json(),
            doc_type: self.doc_type.clone(),
            attributes: self.attributes.clone(),
        };
        let mut text = serde_json::to_string(&wire).expect("document is always serializable");
        text.push('\n');
        text.into_bytes()
    }

    /// Parse canonical bytes back into a `Document`. Tolerates (and strips)
    /// a trailing EOL, per the storage backend's wire contract.
    pub fn from_bytes(bytes: &[u8]) -> ModelResult<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ModelError::MalformedDocument(e.to_string()))?;
        let text = text.strip_suffix('\n').unwrap_or(text);
        let wire: Wire = serde_json::from_str(text)
            .map_err(|e| ModelError::MalformedDocument(e.to_string()))?;
        Ok(Self {
            tag: wire.tag,
            version: wire.version,
            permissions: wire.permissions,
            previous: Previous::from_json(&wire.previous)?,
            doc_type: wire.doc_type,
            attributes: wire.attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_roundtrip() {
        let mut doc = Document::new("tag123", "v1", "/bali/permissions/public/v1", "/bali/types/example/v1");
        doc.attributes.insert("amount".to_string(), Value::from(42));
        let bytes = doc.to_canonical_bytes();

        assert!(bytes.ends_with(b"\n"));
        let parsed = Document::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_deterministic_key_order() {
        let mut a = Document::new("t", "v1", "p", "ty");
        a.attributes.insert("b".to_string(), Value::from(2));
        a.attributes.insert("a".to_string(), Value::from(1));

        let mut b = a.clone();
        b.attributes.clear();
        b.attributes.insert("a".to_string(), Value::from(1));
        b.attributes.insert("b".to_string(), Value::from(2));

        assert_eq!(a.to_canonical_bytes(), b.to_canonical_bytes());
    }

    #[test]
    fn test_tolerates_missing_trailing_newline() {
        let doc = Document::new("t", "v1", "p", "ty");
        let mut bytes = doc.to_canonical_bytes();
        bytes.pop();
        let parsed = Document::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_previous_none_by_default() {
        let doc = Document::new("t", "v1", "p", "ty");
        assert_eq!(doc.previous, Previous::None);
    }
}
