//! Purchase order and receiving HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::receiving::{
    CreateOrderInput, ReceiveInput, ReceivingService, UpdateOrderInput,
};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    #[serde(default)]
    pub open_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct BarcodeMatchInput {
    pub code: String,
    pub active_order_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ScanReceiveInput {
    pub item_id: Uuid,
}

/// Create a purchase order
pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "purchase_orders", "write") {
        return resp;
    }
    let service = ReceivingService::new(state.db.clone());

    match service.create_order(user.user_id, input).await {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List purchase orders
pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<OrderListQuery>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "purchase_orders", "read") {
        return resp;
    }
    let service = ReceivingService::new(state.db.clone());

    match service.list_orders(query.open_only).await {
        Ok(orders) => (StatusCode::OK, Json(serde_json::json!({ "orders": orders }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get an order with its lines
pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "purchase_orders", "read") {
        return resp;
    }
    let service = ReceivingService::new(state.db.clone());

    match service.get_order(order_id).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update an order's expected date or notes
pub async fn update_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateOrderInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "purchase_orders", "write") {
        return resp;
    }
    let service = ReceivingService::new(state.db.clone());

    match service.update_order(order_id, input).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Cancel an order
pub async fn cancel_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "purchase_orders", "write") {
        return resp;
    }
    let service = ReceivingService::new(state.db.clone());

    match service.cancel_order(order_id).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Receive quantities against an order
pub async fn receive_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<ReceiveInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "purchase_orders", "write") {
        return resp;
    }
    let service = ReceivingService::new(state.db.clone());

    match service.receive(order_id, user.user_id, input).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Match a scanned barcode against open orders
pub async fn match_intake_barcode(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<BarcodeMatchInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "purchase_orders", "read") {
        return resp;
    }
    let service = ReceivingService::new(state.db.clone());

    match service.match_barcode(input.active_order_id, &input.code).await {
        Ok(matched) => (StatusCode::OK, Json(matched)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Receive one scanned unit against an order line
pub async fn receive_scanned_unit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<ScanReceiveInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "purchase_orders", "write") {
        return resp;
    }
    let service = ReceivingService::new(state.db.clone());

    match service
        .receive_scanned(order_id, input.item_id, user.user_id)
        .await
    {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}
