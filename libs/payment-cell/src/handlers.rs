use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{CreatePaymentRequest, PaymentSearchQuery, UpdatePaymentRequest};
use crate::services::PaymentService;

#[axum::debug_handler]
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let payment = PaymentService::new(state.store.clone())
        .create_payment(request)
        .await?;

    Ok((StatusCode::CREATED, Json(json!(payment))))
}

#[axum::debug_handler]
pub async fn list_payments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let payments = PaymentService::new(state.store.clone())
        .list_payments()
        .await?;

    Ok(Json(json!({
        "payments": payments,
        "total": payments.len()
    })))
}

#[axum::debug_handler]
pub async fn search_payments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let payments = PaymentService::new(state.store.clone())
        .payments_for_patient(&query.name)
        .await?;

    Ok(Json(json!({
        "payments": payments,
        "total": payments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let payment = PaymentService::new(state.store.clone())
        .get_payment(payment_id)
        .await?;

    Ok(Json(json!(payment)))
}

#[axum::debug_handler]
pub async fn update_payment(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<Value>, AppError> {
    let payment = PaymentService::new(state.store.clone())
        .update_payment(payment_id, request)
        .await?;

    Ok(Json(json!(payment)))
}

#[axum::debug_handler]
pub async fn delete_payment(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    PaymentService::new(state.store.clone())
        .delete_payment(payment_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
