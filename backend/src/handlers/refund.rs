//! Refund HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::refund::{CreateRefundInput, RefundService};
use crate::AppState;

/// Refund a sale by receipt number
pub async fn create_refund(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateRefundInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "refunds", "write") {
        return resp;
    }
    let service = RefundService::new(state.db.clone());

    match service.create(user.user_id, input).await {
        Ok(refund) => (StatusCode::CREATED, Json(refund)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List refunds
pub async fn list_refunds(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "refunds", "read") {
        return resp;
    }
    let service = RefundService::new(state.db.clone());

    match service.list().await {
        Ok(refunds) => {
            (StatusCode::OK, Json(serde_json::json!({ "refunds": refunds }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a refund
pub async fn get_refund(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(refund_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "refunds", "read") {
        return resp;
    }
    let service = RefundService::new(state.db.clone());

    match service.get(refund_id).await {
        Ok(refund) => (StatusCode::OK, Json(refund)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// The refund recorded for a sale, if any
pub async fn get_refund_for_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "refunds", "read") {
        return resp;
    }
    let service = RefundService::new(state.db.clone());

    match service.for_sale(sale_id).await {
        Ok(refund) => (StatusCode::OK, Json(serde_json::json!({ "refund": refund }))).into_response(),
        Err(e) => e.into_response(),
    }
}
