//! Sales HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::sale::{CreateSaleInput, SaleFilter, SaleService};
use crate::AppState;

/// Record a sale
pub async fn create_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "sales", "write") {
        return resp;
    }
    let service = SaleService::new(state.db.clone());

    match service.create(user.user_id, input).await {
        Ok(sale) => (StatusCode::CREATED, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List sales
pub async fn list_sales(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<SaleFilter>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "sales", "read") {
        return resp;
    }
    let service = SaleService::new(state.db.clone());

    match service.list(&filter).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a sale by id
pub async fn get_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "sales", "read") {
        return resp;
    }
    let service = SaleService::new(state.db.clone());

    match service.get(sale_id).await {
        Ok(sale) => (StatusCode::OK, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Look up a sale by receipt number
pub async fn get_sale_by_receipt(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(receipt_number): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "sales", "read") {
        return resp;
    }
    let service = SaleService::new(state.db.clone());

    match service.get_by_receipt(&receipt_number).await {
        Ok(sale) => (StatusCode::OK, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}
