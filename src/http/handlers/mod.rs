//! # Per-resource handlers
//!
//! Each resource class (`names`, `documents`, `contracts`, `messages`)
//! supplies axum handlers that decode their slice of the request, resolve
//! authentication/authorization, call [`decide`](super::decision::decide),
//! and only then invoke the repository for the write/delete effect,
//! keeping the transport-agnostic decision separate from the axum wiring
//! around it.

pub mod contracts;
pub mod documents;
pub mod messages;
pub mod names;

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use super::decision::Decision;
use super::errors::HttpError;
use super::request::decode_credentials;
use crate::model::Document;
use crate::notary::Notary;
use crate::repository::DocumentRepository;
use crate::storage::StorageBackend;

pub const CREDENTIALS_HEADER: &str = "Nebula-Credentials";
pub const DIGEST_HEADER: &str = "Nebula-Digest";
pub const SUBDIGEST_HEADER: &str = "Nebula-Subdigest";

/// Render a bare (non-2xx, no body) cell of the method matrix. Attaches
/// the `WWW-Authenticate` challenge §4.5 mandates on 401s; every handler's
/// `render` funnels its non-success decisions through here rather than
/// re-deriving the header on each call site.
pub(crate) fn render_decision_status(decision: Decision) -> Response {
    let status = StatusCode::from_u16(decision.status_code()).expect("Decision::status_code is always a valid status");
    if decision == Decision::Unauthenticated {
        let mut response = status.into_response();
        response.headers_mut().insert("WWW-Authenticate", HeaderValue::from_static("Nebula-Credentials"));
        return response;
    }
    status.into_response()
}

/// Shared application state: one repository handle, cloned (cheaply,
/// behind the `Arc`) into every handler.
pub type AppState<B, N> = Arc<DocumentRepository<B, N>>;

/// The outcome of step 3/4 of §4.5: whether the caller authenticated, and
/// whether they are authorized against the targeted resource.
#[derive(Debug, Clone, Default)]
pub struct AuthOutcome {
    pub authenticated: bool,
    pub account: Option<String>,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Resolve the caller's credentials, per §4.5 step 3: a present
/// `Nebula-Credentials` header is decoded into a presented contract, whose
/// `$certificate` citation is resolved either from the contract store or
/// (self-signed bootstrap) from the request body; its signature is then
/// verified against that certificate.
pub async fn authenticate<B, N>(
    repo: &DocumentRepository<B, N>,
    headers: &HeaderMap,
    body: Option<&[u8]>,
) -> Result<AuthOutcome, HttpError>
where
    B: StorageBackend,
    N: Notary,
{
    let header_value = match header_str(headers, CREDENTIALS_HEADER) {
        Some(v) => v,
        None => return Ok(AuthOutcome::default()),
    };

    let credentials = decode_credentials(header_value)?;
    let notary = repo.cache().validated().notary();

    let certificate_document = match &credentials.certificate {
        Some(cert_citation) => match repo.cache().read_contract(cert_citation).await {
            Ok(Some(contract)) => contract.document,
            _ => {
                let bytes = body.ok_or_else(|| HttpError::BadRequest("certificate not found and no body to bootstrap from".to_string()))?;
                Document::from_bytes(bytes).map_err(|e| HttpError::BadRequest(e.to_string()))?
            }
        },
        None => credentials.document.clone(),
    };

    let valid = notary
        .valid_contract(&credentials, &certificate_document)
        .map_err(|_| HttpError::BadRequest("credentials signature check failed".to_string()))?;
    if !valid {
        return Ok(AuthOutcome { authenticated: false, account: None });
    }

    let account = certificate_document.attribute("$account").and_then(|v| v.as_str()).map(str::to_string);
    Ok(AuthOutcome { authenticated: true, account })
}

/// §4.5 step 4: authorize iff the resource is addressed by citation (always
/// public), its owning account matches the caller's, or it carries the
/// well-known public-permission tag.
pub fn authorize(auth: &AuthOutcome, addressed_by_citation: bool, resource_permissions: &str, resource_account: Option<&str>) -> bool {
    if addressed_by_citation {
        return true;
    }
    if let (Some(account), Some(resource_account)) = (auth.account.as_deref(), resource_account) {
        if account == resource_account {
            return true;
        }
    }
    crate::model::is_public(resource_permissions)
}
