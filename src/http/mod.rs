//! # HTTP Semantics Engine
//!
//! A pure, transport-agnostic decision function ([`decision::decide`])
//! plus a thin `axum` adapter (`server`, `handlers::*`) that decodes
//! requests, calls it, and renders the result. Per-resource handlers never
//! re-derive the method/status matrix themselves.

pub mod config;
pub mod decision;
pub mod errors;
pub mod handlers;
pub mod request;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::HttpError;
pub use server::HttpServer;
