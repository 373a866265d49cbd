//! Route definitions for the Electronics Store Management Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Storefront routes (public, unauthenticated)
        .nest("/catalog", catalog_routes())
        .route("/inquiries", post(handlers::submit_inquiry))
        // Protected back-office routes
        .nest("/products", product_routes())
        .nest("/serial-units", serial_unit_routes())
        .nest("/purchase-orders", purchase_order_routes())
        .nest("/sales", sale_routes())
        .nest("/refunds", refund_routes())
        .nest("/customers", customer_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/admin/inquiries", inquiry_routes())
        .nest("/users", user_routes())
        .route(
            "/backup",
            get(handlers::export_backup)
                .route_layer(middleware::from_fn(auth_middleware)),
        )
}

/// Authentication routes (public except user management)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route("/setup", post(handlers::setup_admin))
}

/// Public storefront catalog routes
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(handlers::browse_catalog))
        .route("/products/:product_id", get(handlers::catalog_product))
        .route("/categories", get(handlers::catalog_categories))
}

/// Product administration routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/import", post(handlers::import_products))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:product_id/stock", post(handlers::adjust_stock))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Serial unit routes (protected)
fn serial_unit_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_units).post(handlers::register_units))
        .route("/lookup/:code", get(handlers::find_unit_by_code))
        .route("/sweep", post(handlers::run_retention_sweep))
        .route("/:unit_id", get(handlers::get_unit))
        .route("/:unit_id/status", put(handlers::change_unit_status))
        .route("/:unit_id/transfer", put(handlers::transfer_unit))
        .route("/:unit_id/history", get(handlers::unit_history))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchase order and receiving routes (protected)
fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/intake/match", post(handlers::match_intake_barcode))
        .route(
            "/:order_id",
            get(handlers::get_order).put(handlers::update_order),
        )
        .route("/:order_id/cancel", post(handlers::cancel_order))
        .route("/:order_id/receive", post(handlers::receive_order))
        .route("/:order_id/scan", post(handlers::receive_scanned_unit))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sales routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route("/receipt/:receipt_number", get(handlers::get_sale_by_receipt))
        .route("/:sale_id", get(handlers::get_sale))
        .route("/:sale_id/refund", get(handlers::get_refund_for_sale))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Refund routes (protected)
fn refund_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_refunds).post(handlers::create_refund))
        .route("/:refund_id", get(handlers::get_refund))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer routes (protected), including wallets
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_customers).post(handlers::create_customer))
        .route(
            "/:customer_id",
            get(handlers::get_customer).put(handlers::update_customer),
        )
        .route("/:customer_id/wallet", get(handlers::get_wallet))
        .route("/:customer_id/wallet/deposit", post(handlers::deposit))
        .route("/:customer_id/wallet/withdraw", post(handlers::withdraw))
        .route("/:customer_id/wallet/transactions", get(handlers::wallet_ledger))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Supplier routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::deactivate_supplier),
        )
        .route(
            "/:supplier_id/payments",
            get(handlers::list_payments).post(handlers::record_payment),
        )
        .route("/:supplier_id/statement", get(handlers::supplier_statement))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Inquiry management routes (protected)
fn inquiry_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_inquiries))
        .route("/:inquiry_id", get(handlers::get_inquiry))
        .route("/:inquiry_id/status", put(handlers::update_inquiry_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Console user management routes (protected, admin only)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route_layer(middleware::from_fn(auth_middleware))
}
