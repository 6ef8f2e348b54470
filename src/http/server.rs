//! # HTTP Server
//!
//! Thin axum adapter around the decision engine and the per-resource
//! handlers: owns the router and socket binding, nothing else, split
//! into a `HttpServer` struct plus a `build_router` free function.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use super::config::HttpServerConfig;
use super::handlers::{contracts, documents, messages, names, AppState};
use crate::notary::Notary;
use crate::repository::DocumentRepository;
use crate::storage::StorageBackend;

pub struct HttpServer<B, N> {
    config: HttpServerConfig,
    router: Router,
    _repo: std::marker::PhantomData<(B, N)>,
}

impl<B: StorageBackend + 'static, N: Notary + 'static> HttpServer<B, N> {
    pub fn new(repository: Arc<DocumentRepository<B, N>>) -> Self {
        Self::with_config(repository, HttpServerConfig::default())
    }

    pub fn with_config(repository: Arc<DocumentRepository<B, N>>, config: HttpServerConfig) -> Self {
        let router = Self::build_router(repository, &config);
        Self { config, router, _repo: std::marker::PhantomData }
    }

    fn build_router(repository: AppState<B, N>, config: &HttpServerConfig) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
        } else {
            use tower_http::cors::AllowOrigin;
            let origins: Vec<_> = config.cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
            CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
        };

        Router::new()
            .route("/names/*path", get(names::get).head(names::head).put(names::put))
            .route(
                "/documents/:tag/:version",
                get(documents::get).head(documents::head).put(documents::put),
            )
            .route(
                "/contracts/:tag/:version",
                get(contracts::get).head(contracts::head).put(contracts::put),
            )
            .route("/messages/*path", post(messages::post).delete(messages::delete))
            .route("/health", get(health))
            .layer(cors)
            .with_state(repository)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    pub fn router(self) -> Router {
        self.router
    }

    pub async fn start(self) -> std::io::Result<()> {
        let addr: SocketAddr = self.config.socket_addr().parse().expect("invalid socket address");
        crate::observability::log_event_with_fields(crate::observability::Event::Serving, &[("addr", &addr.to_string())]);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await
    }
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notary::ReferenceNotary;
    use crate::storage::MemoryBackend;

    fn repo() -> Arc<DocumentRepository<MemoryBackend, ReferenceNotary>> {
        Arc::new(DocumentRepository::new(MemoryBackend::new(), ReferenceNotary::generate()))
    }

    #[test]
    fn test_server_creation() {
        let server = HttpServer::new(repo());
        assert_eq!(server.socket_addr(), "0.0.0.0:5943");
    }

    #[test]
    fn test_server_with_custom_port() {
        let config = HttpServerConfig::with_port(8080);
        let server = HttpServer::with_config(repo(), config);
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_builds() {
        let server = HttpServer::new(repo());
        let _router = server.router();
    }
}
