//! # `/documents/<tag>/<version>` handlers
//!
//! Addresses an immutable contract's embedded document by citation (the
//! path's tail two segments plus the `Nebula-Digest` header). Immutable
//! once written: PUT on an existing citation is the 409 cell of the
//! matrix. `DELETE` has no meaningful effect on an immutable artifact and
//! is not accepted here (405) — only the bag engine's `messages` class
//! uses the full matrix, per §4.5's note that it alone exposes both POST
//! and two DELETE semantics.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use super::{authenticate, authorize, render_decision_status, AppState, DIGEST_HEADER};
use crate::http::decision::{decide, Auth, Decision, Method};
use crate::model::{is_public, Citation, Contract};
use crate::notary::Notary;
use crate::storage::StorageBackend;

fn digest_header(headers: &HeaderMap) -> Result<String, StatusCode> {
    headers
        .get(DIGEST_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or(StatusCode::BAD_REQUEST)
}

pub(crate) async fn do_get<B: StorageBackend + 'static, N: Notary + 'static>(
    repo: AppState<B, N>,
    tag: String,
    version: String,
    headers: HeaderMap,
    method: Method,
    embed_only: bool,
) -> Result<Response, StatusCode> {
    let digest = digest_header(&headers)?;
    let protocol = repo.cache().validated().notary().certificate().to_string();
    let citation = Citation::new(protocol, format!("#{tag}"), version, digest);

    let contract = repo
        .cache()
        .read_contract(&citation)
        .await
        .map_err(|e| StatusCode::from_u16(crate::repository::RepositoryError::from(e).status_code()).unwrap())?;
    let exists = contract.is_some();

    let auth_outcome = authenticate(&repo, &headers, None).await.map_err(|e| StatusCode::from_u16(e.status_code()).unwrap())?;
    let permissions = contract.as_ref().map(|c| c.document.permissions.as_str()).unwrap_or("");
    let authorized = authorize(&auth_outcome, false, permissions, None);
    // `decide` only ever consults `public` on the `!authenticated` branch
    // (§4.5); gate it here too so this reads the same way it behaves.
    let public = !auth_outcome.authenticated && exists && is_public(permissions);
    let auth = Auth { authenticated: auth_outcome.authenticated, public, authorized };

    let decision = decide(method, exists, false, auth);
    render(decision, contract.as_ref(), embed_only)
}

fn render(decision: Decision, contract: Option<&Contract>, embed_only: bool) -> Result<Response, StatusCode> {
    match decision {
        Decision::Ok => {
            let contract = contract.ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
            let bytes = if embed_only { contract.document.to_canonical_bytes() } else { contract.to_canonical_bytes() };
            Ok((StatusCode::OK, bytes).into_response())
        }
        Decision::OkEmpty => Ok(StatusCode::OK.into_response()),
        other => Ok(render_decision_status(other)),
    }
}

pub async fn get<B: StorageBackend + 'static, N: Notary + 'static>(
    State(repo): State<AppState<B, N>>,
    Path((tag, version)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    do_get(repo, tag, version, headers, Method::Get, true).await
}

pub async fn head<B: StorageBackend + 'static, N: Notary + 'static>(
    State(repo): State<AppState<B, N>>,
    Path((tag, version)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    do_get(repo, tag, version, headers, Method::Head, true).await
}

pub async fn put<B: StorageBackend + 'static, N: Notary + 'static>(
    State(repo): State<AppState<B, N>>,
    Path((tag, version)): Path<(String, String)>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Response, StatusCode> {
    let digest = digest_header(&headers)?;
    let protocol = repo.cache().validated().notary().certificate().to_string();
    let citation = Citation::new(protocol, format!("#{tag}"), version, digest);

    let existing = repo
        .cache()
        .read_contract(&citation)
        .await
        .map_err(|e| StatusCode::from_u16(crate::repository::RepositoryError::from(e).status_code()).unwrap())?;
    let exists = existing.is_some();

    let auth_outcome = authenticate(&repo, &headers, Some(&body)).await.map_err(|e| StatusCode::from_u16(e.status_code()).unwrap())?;
    let authorized = authorize(&auth_outcome, false, "/bali/permissions/public/v1", None);
    let auth = Auth { authenticated: auth_outcome.authenticated, public: false, authorized };
    let decision = decide(Method::Put, exists, false, auth);

    if decision != Decision::Created {
        return Ok(render_decision_status(decision));
    }

    let contract = Contract::from_bytes(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
    let written = repo
        .cache()
        .write_contract(contract)
        .await
        .map_err(|e| StatusCode::from_u16(crate::repository::RepositoryError::from(e).status_code()).unwrap())?;
    Ok((StatusCode::CREATED, written.to_string()).into_response())
}
