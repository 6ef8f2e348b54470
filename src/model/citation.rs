//! # Citation
//!
//! A content-addressed handle `(tag, version, digest)` to one exact document
//! version, with a protocol identifier pinning the notary version that
//! produced it.

use std::fmt;

use super::errors::{ModelError, ModelResult};

/// Strip the leading tag sigil (`#`) used in Bali document notation before
/// the value is used to form a backend key.
fn strip_sigil(value: &str) -> &str {
    value.strip_prefix('#').unwrap_or(value)
}

/// A citation: `(protocol, tag, version, digest)`.
///
/// Citations are produced by `Notary::cite` and are never mutated; two
/// citations are equal iff all four fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Citation {
    pub protocol: String,
    pub tag: String,
    pub version: String,
    pub digest: String,
}

impl Citation {
    pub fn new(protocol: impl Into<String>, tag: impl Into<String>, version: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            tag: tag.into(),
            version: version.into(),
            digest: digest.into(),
        }
    }

    /// The backend key for the document this citation addresses:
    /// `tag/version.bali`, with the tag's `#` sigil stripped.
    pub fn document_key(&self) -> String {
        format!("{}/{}.bali", strip_sigil(&self.tag), self.version)
    }

    /// Parse a citation from its canonical string form
    /// `<protocol>:/<tag>/<version>/<digest>`.
    pub fn parse(s: &str) -> ModelResult<Self> {
        let (protocol, rest) = s
            .split_once(":/")
            .ok_or_else(|| ModelError::MalformedCitation(s.to_string()))?;
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != 3 {
            return Err(ModelError::MalformedCitation(s.to_string()));
        }
        Ok(Self::new(protocol, parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:/{}/{}/{}", self.protocol, self.tag, self.version, self.digest)
    }
}
