//! # `/contracts/<tag>/<version>` handlers
//!
//! Same citation addressing and write semantics as `documents`, but GET
//! renders the full contract envelope (signature, signing certificate
//! citation, timestamp) rather than just the embedded document.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

use super::AppState;
use crate::http::decision::Method;
use crate::notary::Notary;
use crate::storage::StorageBackend;

pub use super::documents::put;

pub async fn get<B: StorageBackend + 'static, N: Notary + 'static>(
    State(repo): State<AppState<B, N>>,
    Path((tag, version)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    super::documents::do_get(repo, tag, version, headers, Method::Get, false).await
}

pub async fn head<B: StorageBackend + 'static, N: Notary + 'static>(
    State(repo): State<AppState<B, N>>,
    Path((tag, version)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    super::documents::do_get(repo, tag, version, headers, Method::Head, false).await
}
