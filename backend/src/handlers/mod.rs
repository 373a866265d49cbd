//! HTTP handlers for the Electronics Store Management Platform

pub mod auth;
pub mod backup;
pub mod catalog;
pub mod customer;
pub mod health;
pub mod product;
pub mod receiving;
pub mod refund;
pub mod sale;
pub mod serial_unit;
pub mod supplier;
pub mod wallet;

pub use auth::*;
pub use backup::*;
pub use catalog::*;
pub use customer::*;
pub use health::*;
pub use product::*;
pub use receiving::*;
pub use refund::*;
pub use sale::*;
pub use serial_unit::*;
pub use supplier::*;
pub use wallet::*;
