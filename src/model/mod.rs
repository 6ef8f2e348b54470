//! # Document Model
//!
//! Typed representations of the seven entities the repository addresses:
//! documents, citations, contracts, names, bags, messages, and certificates.
//!
//! A full Bali Document Notation parser is outside this crate's scope.
//! Documents are modeled as a typed attribute bag (`serde_json::Value`-backed)
//! plus the fixed parameter fields every document carries, with a canonical
//! serialization that produces deterministic UTF-8 text.

mod bag;
mod citation;
mod contract;
mod document;
mod errors;
mod message;
mod name;
mod permissions;

pub use bag::BagConfig;
pub use citation::Citation;
pub use contract::Contract;
pub use document::{Document, Previous};
pub use errors::ModelError;
pub use message::Message;
pub use name::Name;
pub use permissions::{is_public, PUBLIC_PERMISSIONS};
