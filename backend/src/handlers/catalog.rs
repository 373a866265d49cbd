//! Public storefront HTTP handlers
//!
//! Unauthenticated endpoints: catalog browsing and inquiry submission.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::customer::{CreateInquiryInput, CustomerService};
use crate::services::product::{ProductFilter, ProductService};
use crate::AppState;

/// Browse the storefront catalog (active products only)
pub async fn browse_catalog(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> impl IntoResponse {
    let service = ProductService::new(state.db.clone());

    match service.list(&filter, true).await {
        Ok(products) => {
            (StatusCode::OK, Json(serde_json::json!({ "products": products }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Product detail page
pub async fn catalog_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProductService::new(state.db.clone());

    match service.get(product_id).await {
        // Inactive products are invisible to the storefront
        Ok(product) if product.is_active => (StatusCode::OK, Json(product)).into_response(),
        Ok(_) => crate::error::AppError::NotFound("Product".to_string()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Categories for the storefront navigation
pub async fn catalog_categories(State(state): State<AppState>) -> impl IntoResponse {
    let service = ProductService::new(state.db.clone());

    match service.list_categories().await {
        Ok(categories) => {
            (StatusCode::OK, Json(serde_json::json!({ "categories": categories }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Submit a cart as an inquiry (unauthenticated)
pub async fn submit_inquiry(
    State(state): State<AppState>,
    Json(input): Json<CreateInquiryInput>,
) -> impl IntoResponse {
    let service = CustomerService::new(state.db.clone());

    match service.create_inquiry(input).await {
        Ok(inquiry) => (StatusCode::CREATED, Json(inquiry)).into_response(),
        Err(e) => e.into_response(),
    }
}
