//! Customer and inquiry HTTP handlers (back office)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::customer::{CustomerInput, CustomerService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CustomerListQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InquiryListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InquiryStatusInput {
    pub status: String,
}

/// List customers
pub async fn list_customers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CustomerListQuery>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "customers", "read") {
        return resp;
    }
    let service = CustomerService::new(state.db.clone());

    match service.list(query.q.as_deref()).await {
        Ok(customers) => {
            (StatusCode::OK, Json(serde_json::json!({ "customers": customers }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a customer
pub async fn get_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "customers", "read") {
        return resp;
    }
    let service = CustomerService::new(state.db.clone());

    match service.get(customer_id).await {
        Ok(customer) => (StatusCode::OK, Json(customer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CustomerInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "customers", "write") {
        return resp;
    }
    let service = CustomerService::new(state.db.clone());

    match service.create(input).await {
        Ok(customer) => (StatusCode::CREATED, Json(customer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<CustomerInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "customers", "write") {
        return resp;
    }
    let service = CustomerService::new(state.db.clone());

    match service.update(customer_id, input).await {
        Ok(customer) => (StatusCode::OK, Json(customer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List inquiries
pub async fn list_inquiries(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<InquiryListQuery>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "customers", "read") {
        return resp;
    }
    let service = CustomerService::new(state.db.clone());

    match service.list_inquiries(query.status.as_deref()).await {
        Ok(inquiries) => {
            (StatusCode::OK, Json(serde_json::json!({ "inquiries": inquiries }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get an inquiry with its items
pub async fn get_inquiry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(inquiry_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "customers", "read") {
        return resp;
    }
    let service = CustomerService::new(state.db.clone());

    match service.get_inquiry(inquiry_id).await {
        Ok(inquiry) => (StatusCode::OK, Json(inquiry)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update an inquiry's workflow status
pub async fn update_inquiry_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(inquiry_id): Path<Uuid>,
    Json(input): Json<InquiryStatusInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "customers", "write") {
        return resp;
    }
    let service = CustomerService::new(state.db.clone());

    match service.update_inquiry_status(inquiry_id, &input.status).await {
        Ok(inquiry) => (StatusCode::OK, Json(inquiry)).into_response(),
        Err(e) => e.into_response(),
    }
}
