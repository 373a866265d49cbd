//! Product administration HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::{check_permission, CurrentUser};
use crate::services::product::{
    AdjustStockInput, CreateProductInput, ProductFilter, ProductService, UpdateProductInput,
};
use crate::AppState;

/// List products (admin view, can include inactive)
pub async fn list_products(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<ProductFilter>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "products", "read") {
        return resp;
    }
    let service = ProductService::new(state.db.clone());

    match service.list(&filter, false).await {
        Ok(products) => {
            (StatusCode::OK, Json(serde_json::json!({ "products": products }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a product
pub async fn get_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "products", "read") {
        return resp;
    }
    let service = ProductService::new(state.db.clone());

    match service.get(product_id).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "products", "write") {
        return resp;
    }
    let service = ProductService::new(state.db.clone());

    match service.create(input).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "products", "write") {
        return resp;
    }
    let service = ProductService::new(state.db.clone());

    match service.update(product_id, input).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "products", "write") {
        return resp;
    }
    let service = ProductService::new(state.db.clone());

    match service.delete(product_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Manually adjust stock
pub async fn adjust_stock(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "products", "write") {
        return resp;
    }
    let service = ProductService::new(state.db.clone());

    match service.adjust_stock(product_id, user.user_id, input).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Import products from a CSV body
pub async fn import_products(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: String,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "products", "write") {
        return resp;
    }
    let service = ProductService::new(state.db.clone());

    match service.import_csv(user.user_id, &body).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => e.into_response(),
    }
}
