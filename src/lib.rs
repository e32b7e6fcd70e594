//! Content notary service library.
//!
//! Hashes uploaded documents, registers the digest with an on-chain content
//! registry, and exposes auditor attestations over a JSON API.

pub mod admin;
pub mod blockchain;
pub mod config;
pub mod content;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod telemetry;

pub use config::schema::NotaryConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
