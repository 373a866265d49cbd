//! Customer wallet HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::wallet::{WalletMovementInput, WalletService};
use crate::AppState;

/// Get a customer's wallet balance
pub async fn get_wallet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "wallets", "read") {
        return resp;
    }
    let service = WalletService::new(state.db.clone());

    match service.get(customer_id).await {
        Ok(wallet) => (StatusCode::OK, Json(wallet)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Deposit store credit into a customer's wallet
pub async fn deposit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<WalletMovementInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "wallets", "write") {
        return resp;
    }
    let service = WalletService::new(state.db.clone());

    match service.deposit(customer_id, user.user_id, input).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Withdraw store credit from a customer's wallet
pub async fn withdraw(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<WalletMovementInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "wallets", "write") {
        return resp;
    }
    let service = WalletService::new(state.db.clone());

    match service.withdraw(customer_id, user.user_id, input).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Wallet ledger for a customer
pub async fn wallet_ledger(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "wallets", "read") {
        return resp;
    }
    let service = WalletService::new(state.db.clone());

    match service.ledger(customer_id).await {
        Ok(entries) => {
            (StatusCode::OK, Json(serde_json::json!({ "transactions": entries }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
