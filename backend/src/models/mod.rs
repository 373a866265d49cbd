//! Database models for the Electronics Store Management Platform
//!
//! Re-exports the shared domain models; row types tied to a specific query
//! shape live next to the service that issues the query.

pub use shared::models::*;
