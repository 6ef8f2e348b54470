//! nebula-repository - a content-addressed document repository for the Bali Nebula
//!
//! Layered storage (backend → validated → cache) under a typed document
//! repository API, exposed over HTTP by a pure decision engine plus a
//! thin `axum` adapter.

pub mod cache;
pub mod cli;
pub mod http;
pub mod model;
pub mod notary;
pub mod observability;
pub mod repository;
pub mod storage;
pub mod validated;
