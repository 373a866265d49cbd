//! Shared types and models for the Electronics Store Management Platform
//!
//! This crate contains the domain types used by the backend plus the pure
//! computation helpers (order status derivation, refund math, retention
//! cutoffs) so they can be tested without a database.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
