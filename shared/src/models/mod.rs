//! Domain models for the Electronics Store Management Platform

mod product;
mod purchase_order;
mod sale;
mod serial_unit;
mod wallet;

pub use product::*;
pub use purchase_order::*;
pub use sale::*;
pub use serial_unit::*;
pub use wallet::*;
