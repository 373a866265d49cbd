//! Serial unit HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::serial_unit::{
    ChangeStatusInput, RegisterUnitsInput, SerialUnitService, TransferInput, UnitFilter,
};
use crate::AppState;

/// Register one or more serial units
pub async fn register_units(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<RegisterUnitsInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "serial_units", "write") {
        return resp;
    }
    let service = SerialUnitService::new(state.db.clone());

    match service.register(user.user_id, input).await {
        Ok(units) => (StatusCode::CREATED, Json(serde_json::json!({ "units": units }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List units
pub async fn list_units(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<UnitFilter>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "serial_units", "read") {
        return resp;
    }
    let service = SerialUnitService::new(state.db.clone());

    match service.list(&filter).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a unit
pub async fn get_unit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(unit_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "serial_units", "read") {
        return resp;
    }
    let service = SerialUnitService::new(state.db.clone());

    match service.get(unit_id).await {
        Ok(unit) => (StatusCode::OK, Json(unit)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Look up a unit by scanned code
pub async fn find_unit_by_code(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(code): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "serial_units", "read") {
        return resp;
    }
    let service = SerialUnitService::new(state.db.clone());

    match service.find_by_code(&code).await {
        Ok(unit) => (StatusCode::OK, Json(unit)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Change a unit's status
pub async fn change_unit_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(unit_id): Path<Uuid>,
    Json(input): Json<ChangeStatusInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "serial_units", "write") {
        return resp;
    }
    let service = SerialUnitService::new(state.db.clone());

    match service.change_status(unit_id, user.user_id, input).await {
        Ok(unit) => (StatusCode::OK, Json(unit)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Transfer a unit to a new location
pub async fn transfer_unit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(unit_id): Path<Uuid>,
    Json(input): Json<TransferInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "serial_units", "write") {
        return resp;
    }
    let service = SerialUnitService::new(state.db.clone());

    match service.transfer(unit_id, user.user_id, input).await {
        Ok(unit) => (StatusCode::OK, Json(unit)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Audit history for a unit
pub async fn unit_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(unit_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "serial_units", "read") {
        return resp;
    }
    let service = SerialUnitService::new(state.db.clone());

    match service.history(unit_id).await {
        Ok(entries) => {
            (StatusCode::OK, Json(serde_json::json!({ "history": entries }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Run the sold-unit retention sweep on demand
pub async fn run_retention_sweep(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "serial_units", "write") {
        return resp;
    }
    let service = SerialUnitService::new(state.db.clone());
    let retention_days = state.config.store.sold_unit_retention_days;

    match service.sweep_sold_units(retention_days).await {
        Ok(removed) => (StatusCode::OK, Json(serde_json::json!({ "removed": removed }))).into_response(),
        Err(e) => e.into_response(),
    }
}
