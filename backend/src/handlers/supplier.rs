//! Supplier HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::supplier::{PaymentInput, SupplierInput, SupplierService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SupplierListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// List suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SupplierListQuery>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "suppliers", "read") {
        return resp;
    }
    let service = SupplierService::new(state.db.clone());

    match service.list(query.include_inactive).await {
        Ok(suppliers) => {
            (StatusCode::OK, Json(serde_json::json!({ "suppliers": suppliers }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a supplier
pub async fn get_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "suppliers", "read") {
        return resp;
    }
    let service = SupplierService::new(state.db.clone());

    match service.get(supplier_id).await {
        Ok(supplier) => (StatusCode::OK, Json(supplier)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a supplier
pub async fn create_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<SupplierInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "suppliers", "write") {
        return resp;
    }
    let service = SupplierService::new(state.db.clone());

    match service.create(input).await {
        Ok(supplier) => (StatusCode::CREATED, Json(supplier)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a supplier
pub async fn update_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<SupplierInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "suppliers", "write") {
        return resp;
    }
    let service = SupplierService::new(state.db.clone());

    match service.update(supplier_id, input).await {
        Ok(supplier) => (StatusCode::OK, Json(supplier)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Deactivate a supplier
pub async fn deactivate_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "suppliers", "write") {
        return resp;
    }
    let service = SupplierService::new(state.db.clone());

    match service.deactivate(supplier_id).await {
        Ok(supplier) => (StatusCode::OK, Json(supplier)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a payment to a supplier
pub async fn record_payment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<PaymentInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "suppliers", "write") {
        return resp;
    }
    let service = SupplierService::new(state.db.clone());

    match service.record_payment(supplier_id, user.user_id, input).await {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List payments to a supplier
pub async fn list_payments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "suppliers", "read") {
        return resp;
    }
    let service = SupplierService::new(state.db.clone());

    match service.list_payments(supplier_id).await {
        Ok(payments) => {
            (StatusCode::OK, Json(serde_json::json!({ "payments": payments }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Statement of received value versus payments
pub async fn supplier_statement(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "suppliers", "read") {
        return resp;
    }
    let service = SupplierService::new(state.db.clone());

    match service.statement(supplier_id).await {
        Ok(statement) => (StatusCode::OK, Json(statement)).into_response(),
        Err(e) => e.into_response(),
    }
}
