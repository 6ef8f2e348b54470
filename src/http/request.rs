//! # Request decoding
//!
//! Step 1 of §4.5: turn header/path bytes into the typed values every
//! handler needs — a credentials contract, a target citation, a resource
//! type. Kept separate from `decide` so the pure decision table never
//! touches headers, bytes, or paths.

use data_encoding::BASE32;

use super::errors::HttpError;
use crate::model::{Citation, Contract};

/// The four resource classes this surface serves (`statics` is an
/// optional fifth a deployment may add; this crate does not route it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Names,
    Documents,
    Contracts,
    Messages,
}

impl ResourceType {
    pub fn parse(segment: &str) -> Result<Self, HttpError> {
        match segment {
            "names" => Ok(ResourceType::Names),
            "documents" => Ok(ResourceType::Documents),
            "contracts" => Ok(ResourceType::Contracts),
            "messages" => Ok(ResourceType::Messages),
            other => Err(HttpError::UnknownResourceType(other.to_string())),
        }
    }
}

/// Decode the `Nebula-Credentials` header: base-32 to canonical contract
/// bytes, then parsed as a notarized contract.
pub fn decode_credentials(header_value: &str) -> Result<Contract, HttpError> {
    let bytes = BASE32
        .decode(header_value.as_bytes())
        .map_err(|e| HttpError::BadRequest(format!("malformed Nebula-Credentials: {e}")))?;
    Contract::from_bytes(&bytes).map_err(|e| HttpError::BadRequest(format!("malformed credentials document: {e}")))
}

/// Encode a contract into the `Nebula-Credentials` wire form (the inverse
/// of [`decode_credentials`]), for clients constructing requests.
pub fn encode_credentials(contract: &Contract) -> String {
    BASE32.encode(&contract.to_canonical_bytes())
}

/// Build the target citation for `/documents/<tag>/<version>` (and,
/// analogously, `/contracts/<tag>/<version>`) from the path's tail two
/// segments plus the `Nebula-Digest` header value.
pub fn citation_from_path(tag: &str, version: &str, digest: &str, protocol: &str) -> Citation {
    Citation::new(protocol, format!("#{tag}"), version, digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;
    use crate::notary::{Notary, ReferenceNotary, PUBLIC_KEY_ATTRIBUTE};
    use serde_json::Value;

    #[test]
    fn test_credentials_roundtrip() {
        let notary = ReferenceNotary::generate();
        let mut cert = Document::new("#cert1", "v1", "/bali/permissions/public/v1", "/bali/types/certificate/v1");
        cert.attributes.insert(PUBLIC_KEY_ATTRIBUTE.to_string(), Value::from(notary.public_key_hex()));
        let contract = notary.notarize(cert, None).unwrap();

        let encoded = encode_credentials(&contract);
        let decoded = decode_credentials(&encoded).unwrap();
        assert_eq!(decoded.document, contract.document);
    }

    #[test]
    fn test_decode_rejects_malformed_base32() {
        assert!(decode_credentials("not valid base32!!").is_err());
    }

    #[test]
    fn test_resource_type_parse() {
        assert_eq!(ResourceType::parse("messages").unwrap(), ResourceType::Messages);
        assert!(ResourceType::parse("bogus").is_err());
    }

    #[test]
    fn test_citation_from_path_strips_nothing_adds_sigil() {
        let citation = citation_from_path("abc123", "v1", "deadbeef", "v1");
        assert_eq!(citation.document_key(), "abc123/v1.bali");
    }
}
