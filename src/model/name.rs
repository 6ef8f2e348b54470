//! # Name
//!
//! A stable, append-only slash-path that resolves to a citation, e.g.
//! `/bali/certificates/abc/v1`.

use std::fmt;

use super::errors::{ModelError, ModelResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(String);

impl Name {
    /// Parse and validate a slash-path name. Must start with `/` and must
    /// not end with `/`.
    pub fn parse(path: impl Into<String>) -> ModelResult<Self> {
        let path = path.into();
        if !path.starts_with('/') || path.ends_with('/') || path.len() < 2 {
            return Err(ModelError::MalformedName(path));
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The backend key for this name: the slash-path with its leading `/`
    /// stripped and a `.bali` suffix appended.
    pub fn storage_key(&self) -> String {
        format!("{}.bali", self.0.trim_start_matches('/'))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
