//! Business logic services for the Electronics Store Management Platform

pub mod auth;
pub mod backup;
pub mod customer;
pub mod product;
pub mod receiving;
pub mod refund;
pub mod sale;
pub mod serial_unit;
pub mod supplier;
pub mod wallet;

pub use auth::AuthService;
pub use backup::BackupService;
pub use customer::CustomerService;
pub use product::ProductService;
pub use receiving::ReceivingService;
pub use refund::RefundService;
pub use sale::SaleService;
pub use serial_unit::SerialUnitService;
pub use supplier::SupplierService;
pub use wallet::WalletService;
