//! # `/names/*` handlers
//!
//! Names are immutable once bound: GET resolves to a citation, PUT binds
//! one (201) and refuses a rebind (409 under the authorized-and-immutable
//! cell of the matrix — a name that exists is never "mutable").

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use super::{authenticate, authorize, render_decision_status, AppState};
use crate::http::decision::{decide, Auth, Decision, Method};
use crate::http::errors::HttpError;
use crate::model::{is_public, Citation, Name};
use crate::notary::Notary;
use crate::storage::StorageBackend;

async fn resolve<B: StorageBackend, N: Notary>(repo: &AppState<B, N>, path: &str) -> Result<(Name, Option<Citation>), HttpError> {
    let name = Name::parse(format!("/{path}")).map_err(|e| HttpError::BadRequest(e.to_string()))?;
    let citation = repo.cache().read_name(&name).await.map_err(crate::repository::RepositoryError::from)?;
    Ok((name, citation))
}

fn render(decision: Decision, citation: Option<&Citation>) -> Response {
    match decision {
        Decision::Ok | Decision::Created if citation.is_some() => {
            (StatusCode::from_u16(decision.status_code()).unwrap(), citation.unwrap().to_string()).into_response()
        }
        other => render_decision_status(other),
    }
}

pub async fn get<B: StorageBackend + 'static, N: Notary + 'static>(
    State(repo): State<AppState<B, N>>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    handle(repo, path, headers, Method::Get, None).await
}

pub async fn head<B: StorageBackend + 'static, N: Notary + 'static>(
    State(repo): State<AppState<B, N>>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    handle(repo, path, headers, Method::Head, None).await
}

pub async fn put<B: StorageBackend + 'static, N: Notary + 'static>(
    State(repo): State<AppState<B, N>>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Response, StatusCode> {
    handle(repo, path, headers, Method::Put, Some(body.to_vec())).await
}

async fn handle<B: StorageBackend + 'static, N: Notary + 'static>(
    repo: AppState<B, N>,
    path: String,
    headers: HeaderMap,
    method: Method,
    body: Option<Vec<u8>>,
) -> Result<Response, StatusCode> {
    let (name, citation) = resolve(&repo, &path).await.map_err(|e| StatusCode::from_u16(e.status_code()).unwrap())?;
    let exists = citation.is_some();

    let auth_outcome = authenticate(&repo, &headers, body.as_deref())
        .await
        .map_err(|e| StatusCode::from_u16(e.status_code()).unwrap())?;
    // Names carry no permissions of their own; a bound name is visible to
    // anyone who can resolve it, so treat existing names as public for the
    // anonymous-read column.
    let authorized = authorize(&auth_outcome, false, "/bali/permissions/public/v1", None);

    // `decide` only ever consults `public` on the `!authenticated` branch
    // (§4.5); gate it here too so this reads the same way it behaves.
    let public = !auth_outcome.authenticated && exists && is_public("/bali/permissions/public/v1");
    let auth = Auth { authenticated: auth_outcome.authenticated, public, authorized };
    let decision = decide(method, exists, false, auth);

    if decision == Decision::Created {
        let body = body.ok_or(StatusCode::BAD_REQUEST)?;
        let text = std::str::from_utf8(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
        let new_citation = Citation::parse(text.trim()).map_err(|_| StatusCode::BAD_REQUEST)?;
        repo.cache().write_name(&name, &new_citation).await.map_err(|e| {
            StatusCode::from_u16(crate::repository::RepositoryError::from(e).status_code()).unwrap()
        })?;
        return Ok(render(Decision::Created, Some(&new_citation)));
    }

    Ok(render(decision, citation.as_ref()))
}
