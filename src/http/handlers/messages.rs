//! # `/messages/<bag-path...>` handlers
//!
//! The one resource class with its own DELETE split: a bag path alone
//! borrows (receive, implicit lease), a bag path plus a message
//! sub-citation digest accepts (hard delete) that held lease. POST
//! enqueues. GET/HEAD report on the bag itself, reusing the same
//! existence/visibility questions as `names`/`contracts`.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use super::{authenticate, authorize, render_decision_status, AppState, SUBDIGEST_HEADER};
use crate::http::decision::{decide, Auth, Decision, Method};
use crate::model::{is_public, Document, Name};
use crate::notary::Notary;
use crate::storage::StorageBackend;

async fn bag_auth<B: StorageBackend + 'static, N: Notary + 'static>(
    repo: &AppState<B, N>,
    bag: &Name,
    headers: &HeaderMap,
    body: Option<&[u8]>,
) -> Result<(bool, Auth), StatusCode> {
    let citation = repo
        .cache()
        .read_name(bag)
        .await
        .map_err(|e| StatusCode::from_u16(crate::repository::RepositoryError::from(e).status_code()).unwrap())?;
    let exists = citation.is_some();
    let permissions = match &citation {
        Some(c) => repo
            .cache()
            .read_contract(c)
            .await
            .map_err(|e| StatusCode::from_u16(crate::repository::RepositoryError::from(e).status_code()).unwrap())?
            .map(|c| c.document.permissions),
        None => None,
    };
    let permissions = permissions.unwrap_or_default();

    let auth_outcome = authenticate(repo, headers, body).await.map_err(|e| StatusCode::from_u16(e.status_code()).unwrap())?;
    let authorized = authorize(&auth_outcome, false, &permissions, None);
    // `decide` only ever consults `public` on the `!authenticated` branch
    // (§4.5); gate it here too so this reads the same way it behaves.
    let public = !auth_outcome.authenticated && exists && is_public(&permissions);
    let auth = Auth { authenticated: auth_outcome.authenticated, public, authorized };
    Ok((exists, auth))
}

fn bag_name(path: &str) -> Result<Name, StatusCode> {
    Name::parse(format!("/{path}")).map_err(|_| StatusCode::BAD_REQUEST)
}

pub async fn post<B: StorageBackend + 'static, N: Notary + 'static>(
    State(repo): State<AppState<B, N>>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Response, StatusCode> {
    let bag = bag_name(&path)?;
    let (exists, auth) = bag_auth(&repo, &bag, &headers, Some(&body)).await?;
    let decision = decide(Method::Post, exists, true, auth);
    if decision != Decision::Created {
        return Ok(render_decision_status(decision));
    }

    let document = Document::from_bytes(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
    let citation = repo
        .post_message(&bag, document)
        .await
        .map_err(|e| StatusCode::from_u16(e.status_code()).unwrap())?;
    Ok((StatusCode::CREATED, citation.to_string()).into_response())
}

/// DELETE on a bag path with no message sub-citation: borrow.
pub async fn borrow<B: StorageBackend + 'static, N: Notary + 'static>(
    State(repo): State<AppState<B, N>>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let bag = bag_name(&path)?;
    let (exists, auth) = bag_auth(&repo, &bag, &headers, None).await?;
    let decision = decide(Method::Delete, exists, true, auth);
    if decision != Decision::Ok {
        return Ok(render_decision_status(decision));
    }

    match repo.receive_message(&bag).await.map_err(|e| StatusCode::from_u16(e.status_code()).unwrap())? {
        Some(message) => Ok((StatusCode::OK, message.document.to_canonical_bytes()).into_response()),
        None => Ok(StatusCode::OK.into_response()),
    }
}

/// Dispatches to [`accept`] when `Nebula-Subdigest` is present, else
/// [`borrow`] — the one resource class whose DELETE has two meanings.
pub async fn delete<B: StorageBackend + 'static, N: Notary + 'static>(
    state: State<AppState<B, N>>,
    path: Path<String>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    if headers.contains_key(SUBDIGEST_HEADER) {
        accept(state, path, headers).await
    } else {
        borrow(state, path, headers).await
    }
}

/// DELETE on a bag path plus a message sub-citation digest (carried in
/// `Nebula-Subdigest`): accept.
pub async fn accept<B: StorageBackend + 'static, N: Notary + 'static>(
    State(repo): State<AppState<B, N>>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let bag = bag_name(&path)?;
    let (exists, auth) = bag_auth(&repo, &bag, &headers, None).await?;
    let decision = decide(Method::Delete, exists, true, auth);
    if decision != Decision::Ok {
        return Ok(render_decision_status(decision));
    }

    let digest = headers
        .get(SUBDIGEST_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::BAD_REQUEST)?;
    repo.accept_message_by_digest(&bag, digest)
        .await
        .map_err(|e| StatusCode::from_u16(e.status_code()).unwrap())?;
    Ok(StatusCode::OK.into_response())
}
