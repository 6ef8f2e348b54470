//! # Reference notary
//!
//! SHA-256 over the canonical document bytes for the citation digest;
//! Ed25519 over that same digest for contract signatures. Both are
//! widely-used, unexotic primitives appropriate for a reference/test
//! notary; a production deployment is expected to swap in its own
//! `Notary` behind the trait.

use chrono::Utc;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::errors::NotaryError;
use super::Notary;
use crate::model::{Citation, Contract, Document};

const PROTOCOL: &str = "v1";

/// The attribute name a certificate document stores its Ed25519 public key
/// under, hex-encoded.
pub const PUBLIC_KEY_ATTRIBUTE: &str = "$publicKey";

/// A notary backed by a single Ed25519 keypair.
#[derive(Debug)]
pub struct ReferenceNotary {
    signing_key: SigningKey,
}

impl ReferenceNotary {
    /// Generate a fresh keypair.
    pub fn generate() -> Self {
        let mut csprng = OsRng {};
        Self { signing_key: SigningKey::generate(&mut csprng) }
    }

    /// Construct from raw keypair bytes (64 bytes: secret || public), the
    /// format [`ReferenceNotary::to_bytes`] produces.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NotaryError> {
        let array: [u8; 64] = bytes
            .try_into()
            .map_err(|_| NotaryError::InvalidPublicKey("keypair must be 64 bytes".to_string()))?;
        let signing_key =
            SigningKey::from_keypair_bytes(&array).map_err(|e| NotaryError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// Raw keypair bytes (64 bytes: secret || public), for persisting a
    /// generated identity across restarts via [`ReferenceNotary::from_bytes`].
    pub fn to_bytes(&self) -> [u8; 64] {
        self.signing_key.to_keypair_bytes()
    }

    /// The public key, hex-encoded, suitable for embedding in a self-signed
    /// certificate document under [`PUBLIC_KEY_ATTRIBUTE`].
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().as_bytes())
    }

    fn digest(document: &Document) -> String {
        let mut hasher = Sha256::new();
        hasher.update(document.to_canonical_bytes());
        hex::encode(hasher.finalize())
    }

    fn extract_public_key(certificate: &Document) -> Result<VerifyingKey, NotaryError> {
        let hex_key = certificate
            .attribute(PUBLIC_KEY_ATTRIBUTE)
            .and_then(Value::as_str)
            .ok_or_else(|| NotaryError::MalformedCertificate("missing $publicKey".to_string()))?;
        let bytes = hex::decode(hex_key)
            .map_err(|e| NotaryError::MalformedCertificate(e.to_string()))?;
        let array: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| NotaryError::InvalidPublicKey("public key must be 32 bytes".to_string()))?;
        VerifyingKey::from_bytes(&array).map_err(|e| NotaryError::InvalidPublicKey(e.to_string()))
    }
}

impl Notary for ReferenceNotary {
    fn cite(&self, document: &Document) -> Citation {
        Citation::new(PROTOCOL, document.tag.clone(), document.version.clone(), Self::digest(document))
    }

    fn notarize(&self, document: Document, certificate: Option<Citation>) -> Result<Contract, NotaryError> {
        let digest = Self::digest(&document);
        let signature = self.signing_key.sign(digest.as_bytes());
        Ok(Contract::new(document, certificate, hex::encode(signature.to_bytes()), Utc::now()))
    }

    fn valid_contract(&self, contract: &Contract, signing_certificate: &Document) -> Result<bool, NotaryError> {
        let public_key = Self::extract_public_key(signing_certificate)?;
        let signature_bytes = hex::decode(&contract.signature)
            .map_err(|e| NotaryError::MalformedCertificate(e.to_string()))?;
        let signature_array: [u8; 64] = signature_bytes
            .as_slice()
            .try_into()
            .map_err(|_| NotaryError::InvalidSignature)?;
        let signature = Signature::from_bytes(&signature_array);
        let digest = Self::digest(&contract.document);
        Ok(public_key.verify(digest.as_bytes(), &signature).is_ok())
    }

    fn certificate(&self) -> &str {
        PROTOCOL
    }
}
